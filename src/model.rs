//! The inverse-normalization seam between a model and its downstream consumers.
//!
//! Models keep latents at an internal scale; everything that leaves the sampling
//! call (previews, captured steps, the decoder's input) must first go through the
//! model's `process_latent_out`. The trait keeps that transform opaque; the stock
//! [`LatentFormat`] implementations cover the common model generations with a
//! scale/shift affine map.

use crate::{Error, Result};
use ndarray::{Array4, ArrayView4};

/// The model-side contract the capture path relies on.
pub trait LatentModel {
    /// Channel count of this model's latent space.
    fn latent_channels(&self) -> usize;

    /// Convert an internal-scale latent to the canonical scale expected by
    /// downstream consumers. Returns an owned tensor; rejects tensors whose
    /// channel count does not match [`LatentModel::latent_channels`].
    fn process_latent_out(&self, samples: &ArrayView4<'_, f32>) -> Result<Array4<f32>>;
}

/// A per-model-generation latent scaling: `out = samples / scale_factor + shift_factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatentFormat {
    pub channels: usize,
    pub scale_factor: f32,
    pub shift_factor: f32,
}

impl LatentFormat {
    /// Stable Diffusion 1.x (4 channels).
    pub fn sd15() -> Self {
        Self {
            channels: 4,
            scale_factor: 0.18215,
            shift_factor: 0.0,
        }
    }

    /// Stable Diffusion XL (4 channels).
    pub fn sdxl() -> Self {
        Self {
            channels: 4,
            scale_factor: 0.13025,
            shift_factor: 0.0,
        }
    }

    /// Flux.1 (16 channels, shifted).
    pub fn flux() -> Self {
        Self {
            channels: 16,
            scale_factor: 0.3611,
            shift_factor: 0.1159,
        }
    }

    /// A caller-defined format. `scale_factor` must be positive and finite.
    pub fn custom(channels: usize, scale_factor: f32, shift_factor: f32) -> Result<Self> {
        if channels == 0 {
            return Err(Error::Domain("channels must be >= 1"));
        }
        if !(scale_factor > 0.0) || !scale_factor.is_finite() {
            return Err(Error::Domain("scale_factor must be positive and finite"));
        }
        if !shift_factor.is_finite() {
            return Err(Error::Domain("shift_factor must be finite"));
        }
        Ok(Self {
            channels,
            scale_factor,
            shift_factor,
        })
    }
}

impl LatentModel for LatentFormat {
    fn latent_channels(&self) -> usize {
        self.channels
    }

    fn process_latent_out(&self, samples: &ArrayView4<'_, f32>) -> Result<Array4<f32>> {
        if samples.shape()[1] != self.channels {
            return Err(Error::Shape("latent channel count does not match the model"));
        }
        let scale = self.scale_factor;
        let shift = self.shift_factor;
        Ok(samples.mapv(|v| v / scale + shift))
    }
}
