mod preprocess;
mod sample_consensus;
pub mod types;

pub use preprocess::{rgb_to_yuv, yuv_to_rgb, Preprocessor};
pub use sample_consensus::{Seeding, ViBeSegmenter};
pub use types::{Matte, SegmentationModel};

use crate::vibe::ModelParams;
use anyhow::Result;

/// Create a default segmentation model (sample consensus)
pub fn create_default_model(
    width: u32,
    height: u32,
    params: ModelParams,
    seeding: Seeding,
) -> Result<Box<dyn SegmentationModel>> {
    let model = ViBeSegmenter::new(width, height, params, seeding)?;
    Ok(Box::new(model))
}
