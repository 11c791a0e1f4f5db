//! The step-capturing sampling operator.
//!
//! [`sample_all_steps`] wires one sampling invocation together: it reconciles the
//! input latent with the model, asks the noise source for the initial noise,
//! composes the capturing observer around the progress observer, runs the guider
//! (the dominant cost and the only blocking step), and assembles three
//! independently owned outputs:
//!
//! 1. the final raw latent,
//! 2. the final denoised latent (falling back to the raw output when no estimate
//!    was seen),
//! 3. every captured denoised estimate as one ordered batch.
//!
//! All per-invocation state (accumulator, last-estimate slot) is created inside
//! the call, so invocations never share anything and the call must not be
//! retried on failure: a rerun would re-consume the noise source.

use crate::guider::Guider;
use crate::latent::{cat_batch, fix_empty_latent_channels, Latent};
use crate::noise::NoiseSource;
use crate::observer::{CaptureObserver, StepObserver};
use crate::progress::{prepare_progress_observer, X0Slot};
use crate::{Error, Result};
use ndarray::ArrayView1;

/// Per-call configuration. Nothing here is ambient process state.
#[derive(Debug, Clone, Default)]
pub struct SampleConfig {
    /// Ask the guider to skip its step display for this call.
    pub disable_progress_bar: bool,
}

/// The three outputs of one step-capturing sampling invocation.
#[derive(Debug, Clone)]
pub struct AllStepsOutput {
    /// The final raw latent.
    pub output: Latent,
    /// The final denoised latent; equal in value to `output` when the run
    /// produced no final estimate.
    pub denoised: Latent,
    /// Every captured denoised estimate, canonical scale, in callback order,
    /// with `batch_index = 0..count`. Falls back to the raw output when nothing
    /// was captured.
    pub all_steps: Latent,
}

/// Run one guided sampling invocation, capturing every intermediate denoised
/// estimate.
///
/// Collaborator failures (noise generation, sampling, inverse-normalization)
/// propagate unchanged; zero captured steps and a missing final estimate are
/// not errors but documented fallbacks.
pub fn sample_all_steps<N: NoiseSource, G: Guider>(
    noise: &N,
    guider: &G,
    sampler: &G::Sampler,
    sigmas: &ArrayView1<'_, f32>,
    latent: &Latent,
    cfg: &SampleConfig,
) -> Result<AllStepsOutput> {
    if sigmas.is_empty() {
        return Err(Error::Domain("sigmas must be non-empty"));
    }
    let model = guider.model();

    // An all-zero placeholder latent is reconciled with the model's channel
    // count before anything looks at it; real latents pass through untouched.
    let fixed = fix_empty_latent_channels(model.latent_channels(), latent.samples.clone());
    let latent = latent.with_samples(fixed);

    let total_steps = sigmas.len().saturating_sub(1);
    let initial_noise = noise.generate_noise(&latent);

    let mut x0_slot = X0Slot::default();
    let inner: Option<Box<dyn StepObserver + '_>> =
        match prepare_progress_observer(total_steps, &mut x0_slot) {
            Some(progress) => Some(Box::new(progress)),
            None => None,
        };
    let mut capture = CaptureObserver::new(model, inner);

    let mask_view = latent.noise_mask.as_ref().map(|mask| mask.view());
    let raw = guider.sample(
        &initial_noise.view(),
        &latent.samples.view(),
        sampler,
        sigmas,
        mask_view.as_ref(),
        &mut capture,
        cfg.disable_progress_bar,
        noise.seed(),
    )?;

    let steps = capture.into_steps();

    let output = latent.with_samples(raw.clone());

    // No final estimate means there is no separate clean-image result; the raw
    // output stands in for it.
    let denoised = match x0_slot.take() {
        Some(x0) => latent.with_samples(model.process_latent_out(&x0.view())?),
        None => output.clone(),
    };

    let all_steps = if steps.is_empty() {
        latent.with_samples(raw)
    } else {
        let count = steps.len();
        let mut batched = latent.with_samples(cat_batch(&steps)?);
        batched.batch_index = Some((0..count).collect());
        batched
    };

    Ok(AllStepsOutput {
        output,
        denoised,
        all_steps,
    })
}
