//! Element-wise batch decoding through an external decoder.
//!
//! [`decode_batch`] feeds a latent batch to a [`Vae`] one element at a time and
//! concatenates the results in order. Decoding per element deliberately assumes
//! nothing about whether the collaborator handles batched input, and makes
//! order preservation independent of the decoder's internals.

use crate::latent::{cat_batch, Latent};
use crate::{Error, Result};
use ndarray::{Array4, ArrayView4};

/// The decode collaborator. Receives single-element batches only.
pub trait Vae {
    /// Decode one latent (leading batch dimension of size 1) into an image
    /// tensor with a leading batch dimension of size 1.
    fn decode(&self, latent: &ArrayView4<'_, f32>) -> Result<Array4<f32>>;
}

/// Decode every element of `latent` independently, preserving batch order.
///
/// Element *i* of the result is the decode of latent element *i*. A failure on
/// any element aborts the call; no partial output is returned.
pub fn decode_batch(vae: &dyn Vae, latent: &Latent) -> Result<Array4<f32>> {
    let batch = latent.batch_size();
    if batch == 0 {
        return Err(Error::Domain("latent batch must be non-empty"));
    }
    let mut images: Vec<Array4<f32>> = Vec::with_capacity(batch);
    for i in 0..batch {
        let single = latent.slice_batch(i)?;
        images.push(vae.decode(&single.view())?);
    }
    cat_batch(&images)
}
