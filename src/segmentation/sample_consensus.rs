use super::preprocess::Preprocessor;
use super::types::{Matte, SegmentationModel};
use crate::vibe::{Model, ModelParams};
use anyhow::{Context, Result};
use image::RgbImage;

/// How a fresh model gets its first samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seeding {
    /// Fill every slot from the first frame (jittered by sigma)
    FirstFrame,
    /// Run forced-replace updates for this many frames before classifying
    WarmUp(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    WarmingUp(u32),
    Warm,
}

/// Sample-consensus background subtraction
///
/// Frames are converted to AYUV at the working resolution, classified, and
/// then fed back into the model. The model is built lazily on the first frame
/// and discarded by [`reset_state`](SegmentationModel::reset_state).
pub struct ViBeSegmenter {
    params: ModelParams,
    preprocessor: Preprocessor,
    width: u32,
    height: u32,
    seeding: Seeding,

    model: Option<Model>,
    phase: Phase,
    buffer: Vec<u8>,
    last_score: Option<f64>,
}

impl ViBeSegmenter {
    /// Create a segmenter working at `width`x`height`
    ///
    /// Frames of any other size are scaled to the working resolution on the
    /// way in and the matte is scaled back on the way out.
    pub fn new(width: u32, height: u32, params: ModelParams, seeding: Seeding) -> Result<Self> {
        anyhow::ensure!(
            width > 0 && height > 0,
            "Working resolution must be non-zero, got {}x{}",
            width,
            height
        );

        tracing::info!(
            "Sample-consensus segmenter at {}x{}, {} samples per pixel, {:?}",
            width,
            height,
            params.nsamples,
            seeding
        );

        Ok(Self {
            params,
            preprocessor: Preprocessor::new(width, height),
            width,
            height,
            seeding,
            model: None,
            phase: Phase::Uninitialized,
            buffer: Vec::new(),
            last_score: None,
        })
    }

    /// Normalized global score of the last classified frame
    pub fn last_score(&self) -> Option<f64> {
        self.last_score
    }

    pub fn is_warm(&self) -> bool {
        self.phase == Phase::Warm
    }

    fn model(&mut self) -> Result<&mut Model> {
        if self.model.is_none() {
            let model = Model::with_params(self.width as usize, self.height as usize, &self.params)
                .context("Failed to create background model")?;
            self.model = Some(model);
            self.phase = Phase::Uninitialized;
        }
        self.model
            .as_mut()
            .context("Background model missing after creation")
    }
}

impl SegmentationModel for ViBeSegmenter {
    fn segment(&mut self, frame: &RgbImage) -> Result<Matte> {
        let _span = tracing::debug_span!("vibe_segment").entered();

        self.model()?;
        self.preprocessor.preprocess(frame, &mut self.buffer);

        let mut view = self
            .preprocessor
            .frame(&mut self.buffer)
            .context("Failed to wrap preprocessed frame")?;
        let model = self
            .model
            .as_mut()
            .context("Background model missing")?;

        let phase = match (self.phase, self.seeding) {
            (Phase::Uninitialized, Seeding::FirstFrame) => {
                model.init_model(&view).context("Failed to seed model")?;
                tracing::info!("Background model seeded from first frame");
                Phase::Warm
            }
            (Phase::Uninitialized, Seeding::WarmUp(0)) => Phase::Warm,
            (Phase::Uninitialized, Seeding::WarmUp(_)) => Phase::WarmingUp(0),
            (phase, _) => phase,
        };

        self.phase = match phase {
            Phase::WarmingUp(done) => {
                model.update_forced(&view).context("Failed to warm up model")?;
                let done = done + 1;
                match self.seeding {
                    Seeding::WarmUp(total) if done >= total => {
                        tracing::info!("Background model warmed up after {} frames", done);
                        Phase::Warm
                    }
                    _ => Phase::WarmingUp(done),
                }
            }
            _ => {
                let score = model.classify(&mut view).context("Failed to classify frame")?;
                model.update(&view).context("Failed to update model")?;
                self.last_score = Some(score);
                Phase::Warm
            }
        };

        // Project the scores into the luma plane; the buffer is rebuilt next frame
        let luma = view.layout().y;
        view.copy_score_to(luma).context("Failed to project scores")?;

        let (frame_width, frame_height) = frame.dimensions();
        let matte = Preprocessor::luma_matte(&view);
        Ok(Preprocessor::postprocess_matte(
            matte,
            frame_width,
            frame_height,
        ))
    }

    fn reset_state(&mut self) {
        tracing::info!("Resetting background model");
        if let Some(model) = self.model.take() {
            model.destroy();
        }
        self.phase = Phase::Uninitialized;
        self.last_score = None;
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn background(&self) -> Option<RgbImage> {
        let model = self.model.as_ref()?;
        if self.phase == Phase::Uninitialized {
            return None;
        }

        let mut buf = vec![0u8; self.preprocessor.buffer_len()];
        let mut view = self.preprocessor.frame(&mut buf).ok()?;
        model.preview_into(&mut view).ok()?;
        Some(Preprocessor::frame_to_rgb(&view))
    }
}
