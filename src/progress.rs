//! The wrapped progress observer and its last-estimate slot.
//!
//! The host environment's progress machinery does two things the sampling
//! operator relies on: it tracks the most recent denoised estimate so a final
//! clean-image output can be produced, and it drives whatever step display the
//! host shows. This module models the first as an explicitly passed, exclusively
//! owned [`X0Slot`]; the display side stays behind the guider's `disable_pbar`
//! flag and is not this crate's concern.

use crate::observer::{StepObserver, StepRecord};
use crate::Result;
use ndarray::{Array4, ArrayView4};

/// Holds the last denoised estimate seen during one sampling invocation.
///
/// The stored tensor is raw (internal scale); the consumer decides when to apply
/// the model's inverse-normalization. One slot serves exactly one invocation.
#[derive(Debug, Default)]
pub struct X0Slot {
    last: Option<Array4<f32>>,
}

impl X0Slot {
    pub fn record(&mut self, denoised: &ArrayView4<'_, f32>) {
        self.last = Some(denoised.to_owned());
    }

    pub fn get(&self) -> Option<&Array4<f32>> {
        self.last.as_ref()
    }

    pub fn take(&mut self) -> Option<Array4<f32>> {
        self.last.take()
    }
}

/// The observer returned by [`prepare_progress_observer`].
pub struct ProgressObserver<'a> {
    slot: &'a mut X0Slot,
    total_steps: usize,
}

impl ProgressObserver<'_> {
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }
}

impl StepObserver for ProgressObserver<'_> {
    fn on_step(&mut self, record: &StepRecord<'_>) -> Result<()> {
        if let Some(denoised) = &record.denoised {
            self.slot.record(denoised);
        }
        Ok(())
    }
}

/// Build the progress observer for one sampling invocation.
///
/// Mirrors the host factory contract, which may decline to provide an observer;
/// callers must tolerate `None`.
pub fn prepare_progress_observer(
    total_steps: usize,
    slot: &mut X0Slot,
) -> Option<ProgressObserver<'_>> {
    Some(ProgressObserver { slot, total_steps })
}
