mod image_sequence;
mod loopback;

pub use image_sequence::ImageSequenceOutput;
pub use loopback::V4L2Output;

use anyhow::Result;
use image::{imageops, RgbImage};

/// Trait for output destinations
pub trait OutputSink {
    /// Write a frame to the output
    ///
    /// The frame must already be at [`resolution`](Self::resolution); see
    /// [`fit_to_sink`].
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Get the expected output resolution
    fn resolution(&self) -> (u32, u32);
}

/// Scale `frame` to the sink's resolution if it differs
pub fn fit_to_sink(frame: RgbImage, sink: &dyn OutputSink) -> RgbImage {
    let (width, height) = sink.resolution();
    if frame.dimensions() == (width, height) {
        return frame;
    }

    let _span = tracing::debug_span!("fit_to_sink").entered();
    imageops::resize(&frame, width, height, imageops::FilterType::Triangle)
}
