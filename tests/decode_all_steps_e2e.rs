//! End-to-end flow of the two operators composed: sample with capture, then
//! decode the captured batch element by element.

use ndarray::{array, s, Array4, ArrayView1, ArrayView4};
use stepcap::decode::{decode_batch, Vae};
use stepcap::guider::Guider;
use stepcap::latent::Latent;
use stepcap::model::{LatentFormat, LatentModel};
use stepcap::noise::RandomNoise;
use stepcap::observer::{StepObserver, StepRecord};
use stepcap::sampler::{sample_all_steps, SampleConfig};
use stepcap::{Error, Result};

/// Decodes a latent into a small image whose every pixel is the latent's mean,
/// so each distinct latent yields a distinguishable image.
struct MeanVae;

impl Vae for MeanVae {
    fn decode(&self, latent: &ArrayView4<'_, f32>) -> Result<Array4<f32>> {
        assert_eq!(latent.shape()[0], 1, "decoder expects single-element batches");
        let mean = latent.mean().unwrap_or(0.0);
        Ok(Array4::from_elem((1, 4, 4, 3), mean))
    }
}

/// Rejects every latent whose mean is below a threshold.
struct PickyVae {
    reject_below: f32,
}

impl Vae for PickyVae {
    fn decode(&self, latent: &ArrayView4<'_, f32>) -> Result<Array4<f32>> {
        let mean = latent.mean().unwrap_or(0.0);
        if mean < self.reject_below {
            return Err(Error::Domain("latent mean below decoder threshold"));
        }
        Ok(Array4::from_elem((1, 4, 4, 3), mean))
    }
}

/// Same toy dynamics as the sampling e2e: shrink toward zero, one observer
/// call per step.
struct DecayGuider {
    format: LatentFormat,
}

impl Guider for DecayGuider {
    type Sampler = ();

    fn model(&self) -> &dyn LatentModel {
        &self.format
    }

    fn sample(
        &self,
        noise: &ArrayView4<'_, f32>,
        latent: &ArrayView4<'_, f32>,
        _sampler: &Self::Sampler,
        sigmas: &ArrayView1<'_, f32>,
        _denoise_mask: Option<&ArrayView4<'_, f32>>,
        observer: &mut dyn StepObserver,
        _disable_pbar: bool,
        _seed: u64,
    ) -> Result<Array4<f32>> {
        let total_steps = sigmas.len().saturating_sub(1);
        let mut x = latent.to_owned() + &(noise.to_owned() * sigmas[0]);

        for step in 0..total_steps {
            let sigma = sigmas[step];
            let sigma_next = sigmas[step + 1];

            let denoised = x.mapv(|v| v / (1.0 + sigma * sigma));
            let d = (&x - &denoised).mapv(|v| v / sigma);
            x = &x + &d.mapv(|v| v * (sigma_next - sigma));

            observer.on_step(&StepRecord {
                step,
                total_steps,
                denoised: Some(denoised.view()),
                state: x.view(),
            })?;
        }

        Ok(x)
    }
}

fn batch_of(values: &[f32]) -> Latent {
    let n = values.len();
    let mut samples = Array4::<f32>::zeros((n, 4, 2, 2));
    for (i, &v) in values.iter().enumerate() {
        samples.slice_mut(s![i..i + 1, .., .., ..]).fill(v);
    }
    Latent::new(samples)
}

#[test]
fn decoded_images_follow_latent_order() {
    let latent = batch_of(&[5.0, 1.0, 3.0, 2.0]);
    let images = decode_batch(&MeanVae, &latent).unwrap();

    assert_eq!(images.dim(), (4, 4, 4, 3));
    for (i, &v) in [5.0f32, 1.0, 3.0, 2.0].iter().enumerate() {
        assert_eq!(images[[i, 0, 0, 0]], v, "wrong image at position {i}");
    }
}

#[test]
fn captured_steps_decode_into_one_image_per_step() {
    let guider = DecayGuider {
        format: LatentFormat::sd15(),
    };
    let sigmas = array![4.0f32, 3.0, 2.0, 1.0, 0.5, 0.0];
    let latent = Latent::new(Array4::zeros((1, 4, 8, 8)));

    let out = sample_all_steps(
        &RandomNoise::new(11),
        &guider,
        &(),
        &sigmas.view(),
        &latent,
        &SampleConfig::default(),
    )
    .unwrap();

    let steps = out.all_steps.batch_size();
    let images = decode_batch(&MeanVae, &out.all_steps).unwrap();
    assert_eq!(images.shape()[0], steps);

    // Image i reflects exactly captured element i.
    for i in 0..steps {
        let expected = out
            .all_steps
            .samples
            .slice(s![i..i + 1, .., .., ..])
            .mean()
            .unwrap();
        assert_eq!(images[[i, 0, 0, 0]], expected, "wrong image at step {i}");
    }
}

#[test]
fn one_bad_element_fails_the_whole_decode() {
    // Element 2 of 4 falls below the threshold.
    let latent = batch_of(&[5.0, 4.0, 0.5, 3.0]);
    let vae = PickyVae { reject_below: 1.0 };
    assert!(decode_batch(&vae, &latent).is_err());

    // Position of the bad element does not matter.
    let first_bad = batch_of(&[0.5, 4.0]);
    assert!(decode_batch(&vae, &first_bad).is_err());
    let last_bad = batch_of(&[4.0, 5.0, 0.5]);
    assert!(decode_batch(&vae, &last_bad).is_err());
}
