//! The latent container and its batch plumbing.
//!
//! A [`Latent`] is a `[batch, channels, height, width]` tensor plus the optional
//! entries a node graph threads alongside it: a denoise mask and a per-element
//! provenance index. Derived containers are built by shallow-copy-then-overwrite
//! ([`Latent::with_samples`]): the unrelated entries are carried over, the
//! `samples` tensor is always a fresh owned value.

use crate::{Error, Result};
use ndarray::{concatenate, s, Array4, ArrayView4, Axis};

/// A latent image batch with its graph-level metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Latent {
    /// `[batch, channels, height, width]`, model-internal scale unless stated otherwise.
    pub samples: Array4<f32>,
    /// Optional denoise mask, forwarded verbatim to the sampling call.
    pub noise_mask: Option<Array4<f32>>,
    /// Optional provenance: one index per batch element, in batch order.
    pub batch_index: Option<Vec<usize>>,
}

impl Latent {
    pub fn new(samples: Array4<f32>) -> Self {
        Self {
            samples,
            noise_mask: None,
            batch_index: None,
        }
    }

    /// Derive a container that shares this one's metadata but owns `samples`.
    ///
    /// Two containers derived from the same input never alias their `samples`,
    /// which is what keeps sibling outputs independently mutable.
    pub fn with_samples(&self, samples: Array4<f32>) -> Self {
        Self {
            samples,
            noise_mask: self.noise_mask.clone(),
            batch_index: self.batch_index.clone(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.samples.shape()[0]
    }

    /// Extract batch element `i` keeping the leading batch dimension at size 1.
    pub fn slice_batch(&self, i: usize) -> Result<Array4<f32>> {
        if i >= self.batch_size() {
            return Err(Error::Domain("batch index out of range"));
        }
        Ok(self.samples.slice(s![i..i + 1, .., .., ..]).to_owned())
    }
}

/// Concatenate owned batch members along the batch axis, preserving order.
pub fn cat_batch(parts: &[Array4<f32>]) -> Result<Array4<f32>> {
    if parts.is_empty() {
        return Err(Error::Domain("cannot concatenate an empty batch"));
    }
    let views: Vec<ArrayView4<'_, f32>> = parts.iter().map(|p| p.view()).collect();
    concatenate(Axis(0), &views)
        .map_err(|_| Error::Shape("batch members must agree on non-batch dimensions"))
}

/// Reconcile a latent tensor with the model's expected channel count.
///
/// An all-zero placeholder (the graph's "empty latent") with a mismatched channel
/// count is rebuilt as zeros at the model's channel count. Any tensor with real
/// content passes through unchanged; a genuine mismatch is the model's to reject.
pub fn fix_empty_latent_channels(model_channels: usize, samples: Array4<f32>) -> Array4<f32> {
    let (b, c, h, w) = samples.dim();
    if c == model_channels {
        return samples;
    }
    if samples.iter().all(|&v| v == 0.0) {
        Array4::zeros((b, model_channels, h, w))
    } else {
        samples
    }
}
