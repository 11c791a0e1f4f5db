//! The guided-sampling collaborator seam.
//!
//! A guider orchestrates per-step model evaluation and guidance; this crate only
//! ever calls it and listens. The sampler algorithm it consumes is opaque here
//! (an associated type, forwarded verbatim), as is the sigma schedule.

use crate::model::LatentModel;
use crate::observer::StepObserver;
use crate::Result;
use ndarray::{Array4, ArrayView1, ArrayView4};

/// The external sampling routine and the model it patches.
pub trait Guider {
    /// Opaque sampler algorithm, forwarded verbatim to [`Guider::sample`].
    type Sampler;

    /// The model whose inverse-normalization applies to everything this guider
    /// produces.
    fn model(&self) -> &dyn LatentModel;

    /// Run the full denoising trajectory and return the final latent tensor.
    ///
    /// The guider must invoke `observer.on_step` zero or more times before
    /// returning: synchronously, in line, once per algorithmic step, on the
    /// calling thread. An observer error aborts the trajectory and propagates
    /// out of this call unchanged.
    #[allow(clippy::too_many_arguments)]
    fn sample(
        &self,
        noise: &ArrayView4<'_, f32>,
        latent: &ArrayView4<'_, f32>,
        sampler: &Self::Sampler,
        sigmas: &ArrayView1<'_, f32>,
        denoise_mask: Option<&ArrayView4<'_, f32>>,
        observer: &mut dyn StepObserver,
        disable_pbar: bool,
        seed: u64,
    ) -> Result<Array4<f32>>;
}
