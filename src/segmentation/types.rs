use anyhow::Result;
use image::{GrayImage, RgbImage};

/// Foreground score per pixel: 0 = background, 255 = foreground, 127 = undecided.
/// Dimensions match the input frame dimensions
pub type Matte = GrayImage;

/// Per-frame foreground segmentation as seen by the pipeline
pub trait SegmentationModel {
    /// Process a frame and return its foreground matte
    ///
    /// # Arguments
    /// * `frame` - Input RGB frame
    fn segment(&mut self, frame: &RgbImage) -> Result<Matte>;

    /// Reset internal state
    ///
    /// Call this when:
    /// - Switching cameras
    /// - Scene cuts detected upstream
    /// - Starting a new video session
    fn reset_state(&mut self) {
        // Default implementation: no-op for stateless models
    }

    /// Get the model's working resolution
    ///
    /// Returns (width, height)
    fn input_size(&self) -> (u32, u32);

    /// Render what the model currently believes the background looks like
    fn background(&self) -> Option<RgbImage> {
        None
    }
}
