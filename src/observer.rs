//! The per-step observer seam and the capturing decorator.
//!
//! The external sampler owns the iteration loop, so intermediate state is only
//! observable through a callback it invokes once per step, synchronously, on the
//! calling thread. [`StepObserver`] names that seam; [`CaptureObserver`] is the
//! one concrete observer this crate adds: it retains each step's denoised
//! estimate and forwards every record to a wrapped observer unchanged.

use crate::model::LatentModel;
use crate::Result;
use ndarray::{Array4, ArrayView4};

/// One step's payload, valid only for the duration of the callback.
pub struct StepRecord<'a> {
    /// Step index as delivered by the sampler (monotonic).
    pub step: usize,
    /// Total step count for this invocation.
    pub total_steps: usize,
    /// The model's predicted fully-denoised latent at this step, when available.
    pub denoised: Option<ArrayView4<'a, f32>>,
    /// The current noisy state. Observed, never captured.
    pub state: ArrayView4<'a, f32>,
}

/// The seam the sampler invokes once per step.
pub trait StepObserver {
    fn on_step(&mut self, record: &StepRecord<'_>) -> Result<()>;
}

/// Captures denoised estimates while forwarding every record to a wrapped
/// observer.
///
/// Capture is selective (only steps that carry a denoised estimate append to the
/// accumulator); forwarding is unconditional, so the wrapped observer keeps all
/// of its side effects. One `CaptureObserver` serves exactly one sampling
/// invocation; its accumulator is consumed with [`CaptureObserver::into_steps`].
pub struct CaptureObserver<'a> {
    model: &'a dyn LatentModel,
    inner: Option<Box<dyn StepObserver + 'a>>,
    captured: Vec<Array4<f32>>,
}

impl<'a> CaptureObserver<'a> {
    pub fn new(model: &'a dyn LatentModel, inner: Option<Box<dyn StepObserver + 'a>>) -> Self {
        Self {
            model,
            inner,
            captured: Vec::new(),
        }
    }

    /// Number of estimates captured so far.
    pub fn captured_len(&self) -> usize {
        self.captured.len()
    }

    /// Consume the observer, yielding the captured estimates in callback order.
    pub fn into_steps(self) -> Vec<Array4<f32>> {
        self.captured
    }
}

impl StepObserver for CaptureObserver<'_> {
    fn on_step(&mut self, record: &StepRecord<'_>) -> Result<()> {
        if let Some(denoised) = &record.denoised {
            // `process_latent_out` hands back an owned tensor, so the stored value
            // shares no buffer with whatever the sampler reuses across steps.
            self.captured.push(self.model.process_latent_out(denoised)?);
        }
        if let Some(inner) = self.inner.as_mut() {
            inner.on_step(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LatentFormat;
    use ndarray::Array4;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingObserver {
        records: Rc<Cell<usize>>,
        with_denoised: Rc<Cell<usize>>,
    }

    impl StepObserver for CountingObserver {
        fn on_step(&mut self, record: &StepRecord<'_>) -> Result<()> {
            self.records.set(self.records.get() + 1);
            if record.denoised.is_some() {
                self.with_denoised.set(self.with_denoised.get() + 1);
            }
            Ok(())
        }
    }

    fn counting() -> (CountingObserver, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let records = Rc::new(Cell::new(0));
        let with_denoised = Rc::new(Cell::new(0));
        let observer = CountingObserver {
            records: Rc::clone(&records),
            with_denoised: Rc::clone(&with_denoised),
        };
        (observer, records, with_denoised)
    }

    fn record<'a>(
        step: usize,
        denoised: Option<&'a Array4<f32>>,
        state: &'a Array4<f32>,
    ) -> StepRecord<'a> {
        StepRecord {
            step,
            total_steps: 3,
            denoised: denoised.map(|d| d.view()),
            state: state.view(),
        }
    }

    #[test]
    fn captures_selectively_and_forwards_unconditionally() {
        let format = LatentFormat::custom(4, 1.0, 0.0).unwrap();
        let (inner, records, with_denoised) = counting();
        let mut capture = CaptureObserver::new(&format, Some(Box::new(inner)));

        let state = Array4::<f32>::zeros((1, 4, 2, 2));
        let a = Array4::from_elem((1, 4, 2, 2), 1.0f32);
        let b = Array4::from_elem((1, 4, 2, 2), 2.0f32);

        capture.on_step(&record(0, Some(&a), &state)).unwrap();
        capture.on_step(&record(1, None, &state)).unwrap();
        capture.on_step(&record(2, Some(&b), &state)).unwrap();

        // Every record reached the wrapped observer, estimate or not.
        assert_eq!(records.get(), 3);
        assert_eq!(with_denoised.get(), 2);

        assert_eq!(capture.captured_len(), 2);
        let steps = capture.into_steps();
        assert_eq!(steps[0], a);
        assert_eq!(steps[1], b);
    }

    #[test]
    fn forwards_records_that_carry_no_denoised_estimate() {
        let format = LatentFormat::custom(2, 1.0, 0.0).unwrap();
        let (inner, records, with_denoised) = counting();
        let mut capture = CaptureObserver::new(&format, Some(Box::new(inner)));

        let state = Array4::<f32>::zeros((1, 2, 2, 2));
        for step in 0..4 {
            capture.on_step(&record(step, None, &state)).unwrap();
        }
        assert_eq!(capture.captured_len(), 0);
        assert_eq!(records.get(), 4);
        assert_eq!(with_denoised.get(), 0);
    }

    #[test]
    fn stored_estimates_are_canonical_scale() {
        let format = LatentFormat::sd15();
        let mut capture = CaptureObserver::new(&format, None);

        let state = Array4::<f32>::zeros((1, 4, 2, 2));
        let raw = Array4::from_elem((1, 4, 2, 2), 0.18215f32);
        capture.on_step(&record(0, Some(&raw), &state)).unwrap();

        let steps = capture.into_steps();
        for &v in steps[0].iter() {
            assert!((v - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn inverse_normalization_failures_propagate() {
        let format = LatentFormat::sd15();
        let mut capture = CaptureObserver::new(&format, None);

        let state = Array4::<f32>::zeros((1, 4, 2, 2));
        let wrong = Array4::<f32>::zeros((1, 3, 2, 2));
        assert!(capture.on_step(&record(0, Some(&wrong), &state)).is_err());
        assert_eq!(capture.captured_len(), 0);
    }
}
