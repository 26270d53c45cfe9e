//! ViBe-style sample-consensus background model.
//!
//! Each pixel keeps a handful of colour samples it has seen before. A pixel is
//! background when enough of them lie close to its current colour. Samples are
//! refreshed at random, faster for pixels that are confidently background, and
//! a per-pixel confidence byte tracks how stable each classification has been.

mod classify;
mod error;
mod frame;
mod params;
mod preview;
mod random;
mod samples;
mod update;

pub use classify::{NEUTRAL_SCORE, SCENE_CHANGE_THRESHOLD};
pub use error::{ModelError, Result};
pub use frame::{ChannelLayout, Frame};
pub use params::ModelParams;
pub use random::RandomSource;
pub use samples::{Sample, SampleStore};
pub use update::expt;

use ndarray::{Array2, ArrayView2};

/// Per-pixel background model for a fixed frame size.
pub struct Model {
    width: usize,
    height: usize,
    params: ModelParams,
    cardinality: usize,
    samples: SampleStore,
    confidence: Array2<u8>,
    rng: RandomSource,
    lastscore: f64,
}

impl Model {
    /// Create a model with default tunables and `nsamples` samples per pixel.
    pub fn create(width: usize, height: usize, nsamples: usize) -> Result<Self> {
        let params = ModelParams {
            nsamples,
            ..Default::default()
        };
        Self::with_params(width, height, &params)
    }

    pub fn with_params(width: usize, height: usize, params: &ModelParams) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ModelError::Configuration(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        params.validate()?;

        let pixels = width
            .checked_mul(height)
            .filter(|&p| {
                p.checked_mul(params.nsamples)
                    .and_then(|n| n.checked_mul(3))
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or_else(|| {
                ModelError::Configuration(format!(
                    "{}x{} with {} samples overflows the address space",
                    width, height, params.nsamples
                ))
            })?;

        let samples = SampleStore::new(pixels, params.nsamples)?;
        let confidence = Array2::from_shape_vec(
            (height, width),
            samples::try_filled_vec(pixels, 0u8, "confidence map")?,
        )
        .map_err(|e| ModelError::Configuration(e.to_string()))?;

        let rng = match params.seed {
            Some(seed) => RandomSource::new(seed),
            None => RandomSource::from_entropy(),
        };

        tracing::debug!(
            "Created {}x{} background model with {} samples per pixel",
            width,
            height,
            params.nsamples
        );

        Ok(Self {
            width,
            height,
            params: params.clone(),
            cardinality: params.cardinality(),
            samples,
            confidence,
            rng,
            lastscore: 0.0,
        })
    }

    /// Seed every sample slot from `frame`, jittered by up to half a sigma per
    /// channel, and mark every pixel fully trusted.
    pub fn init_model(&mut self, frame: &Frame) -> Result<()> {
        frame.ensure_dims(self.width, self.height)?;
        let _span = tracing::debug_span!("init_model").entered();

        let sigmas = self.sigmas();
        for y in 0..self.height {
            for x in 0..self.width {
                let colour = frame.colour(x, y);
                let p = y * self.width + x;
                for sample in self.samples.pixel_mut(p) {
                    for c in 0..3 {
                        let noise = self.rng.next_byte() as i32 - 127;
                        let offset = sigmas[c] as i32 * noise / 256;
                        sample[c] = (colour[c] as i32 + offset).clamp(0, 255) as u8;
                    }
                }
            }
        }

        self.confidence.fill(u8::MAX);
        Ok(())
    }

    /// Release the model's storage.
    pub fn destroy(self) {
        tracing::debug!("Releasing {}x{} background model", self.width, self.height);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Normalized global score of the previous `classify` call
    pub fn last_score(&self) -> f64 {
        self.lastscore
    }

    pub fn confidence(&self) -> ArrayView2<'_, u8> {
        self.confidence.view()
    }

    pub fn samples(&self) -> &SampleStore {
        &self.samples
    }

    /// Samples of the pixel at column `x`, row `y`
    pub fn samples_at(&self, x: usize, y: usize) -> &[Sample] {
        self.samples.pixel(y * self.width + x)
    }

    /// Change the match radii; takes effect on the next call.
    pub fn set_sigmas(&mut self, sigma_y: u8, sigma_u: u8, sigma_v: u8) {
        self.params.sigma_y = sigma_y;
        self.params.sigma_u = sigma_u;
        self.params.sigma_v = sigma_v;
    }

    fn sigmas(&self) -> [u8; 3] {
        [self.params.sigma_y, self.params.sigma_u, self.params.sigma_v]
    }
}
