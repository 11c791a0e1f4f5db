//! Noise sources for the sampling operator.
//!
//! The core delegates all randomness to a [`NoiseSource`]: it asks the source for
//! the initial noise tensor and forwards the source's own seed to the guider. Two
//! stock sources are provided, a seeded standard-normal generator and a disabled
//! (all-zeros) one.

use crate::latent::Latent;
use ndarray::{s, Array4};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// Produces the initial noise for one sampling invocation.
pub trait NoiseSource {
    /// The seed forwarded verbatim to the guided-sampling call.
    fn seed(&self) -> u64;

    /// Generate noise shaped like `latent.samples`.
    fn generate_noise(&self, latent: &Latent) -> Array4<f32>;
}

/// Seeded standard-normal noise, generated per batch element.
///
/// Each element's stream is keyed by `(seed, provenance index)`, where the
/// provenance index is the element's `batch_index` entry (its position when the
/// container carries none). Recomposing a batch therefore does not change the
/// noise any given element receives.
#[derive(Debug, Clone, Copy)]
pub struct RandomNoise {
    pub seed: u64,
}

impl RandomNoise {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl NoiseSource for RandomNoise {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn generate_noise(&self, latent: &Latent) -> Array4<f32> {
        let (b, c, h, w) = latent.samples.dim();
        let mut noise = Array4::<f32>::zeros((b, c, h, w));
        for i in 0..b {
            let provenance = latent
                .batch_index
                .as_ref()
                .and_then(|indices| indices.get(i))
                .copied()
                .unwrap_or(i);
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(provenance as u64));
            for v in noise.slice_mut(s![i..i + 1, .., .., ..]).iter_mut() {
                *v = StandardNormal.sample(&mut rng);
            }
        }
        noise
    }
}

/// Disabled noise: all zeros, seed 0.
///
/// Used when a workflow wants the sampling call to start from the latent alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyNoise;

impl NoiseSource for EmptyNoise {
    fn seed(&self) -> u64 {
        0
    }

    fn generate_noise(&self, latent: &Latent) -> Array4<f32> {
        Array4::zeros(latent.samples.raw_dim())
    }
}
