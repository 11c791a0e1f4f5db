//! # stepcap
//!
//! Step-capture instrumentation for iterative latent samplers.
//!
//! This crate is intentionally small:
//!
//! - it wraps a call to an externally supplied guided-sampling routine and, next to
//!   the routine's ordinary outputs, collects every intermediate denoised estimate
//!   ("x0") the routine reports per step, as one ordered batch,
//! - it decodes such batches element by element through an external decoder,
//! - it does **not** implement the sampling mathematics itself: guiders, sampler
//!   algorithms, noise sources and decoders live behind traits and are assumed
//!   correct.
//!
//! ## Public invariants (must not change)
//!
//! - **Capture order is callback order**: element *i* of the all-steps batch is the
//!   *i*-th denoised estimate the sampler delivered, no reordering.
//! - **Captured latents are canonical-scale**: every tensor in the all-steps batch
//!   has had the model's `process_latent_out` applied; internal-scale latents never
//!   appear in that output.
//! - **Degenerate runs fall back, they do not fail**: a run with zero captured
//!   estimates yields the raw sampling output in the all-steps slot, and a run with
//!   no final denoised estimate yields the raw output in the denoised slot.
//! - **Outputs never alias**: the three sampler outputs own their `samples`
//!   independently; writing through one is unobservable through the others.
//! - **Determinism knobs are explicit**: noise sources carry their own seed, and the
//!   core makes no probabilistic decisions itself.
//! - **Backend-agnostic by default**: this crate uses `ndarray`; no GPU framework
//!   types leak through the public API. A device-backed stack plugs in behind the
//!   collaborator traits.
//!
//! ## Module map
//!
//! - `sampler`: the step-capturing sampling operator (main implementation)
//! - `observer`: the per-step observer seam and the capturing decorator
//! - `progress`: the wrapped progress observer and its last-estimate slot
//! - `decode`: element-wise batch decoding through an external decoder
//! - `latent`: the latent container and batch plumbing
//! - `model`: the inverse-normalization seam and stock latent formats
//! - `noise`: the noise-source seam plus seeded and disabled implementations
//! - `guider`: the guided-sampling collaborator seam
//! - `node`: node-graph registration tables for the two operators

pub mod decode;
pub mod guider;
pub mod latent;
pub mod model;
pub mod node;
pub mod noise;
pub mod observer;
pub mod progress;
pub mod sampler;

/// stepcap error variants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("shape mismatch: {0}")]
    Shape(&'static str),
    #[error("domain error: {0}")]
    Domain(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
