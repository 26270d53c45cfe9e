use super::OutputSink;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Writes every frame as a numbered PNG
pub struct ImageSequenceOutput {
    dir: PathBuf,
    next_index: u64,
    width: u32,
    height: u32,
}

impl ImageSequenceOutput {
    pub fn new<P: AsRef<Path>>(dir: P, width: u32, height: u32) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        tracing::info!("Writing frames to {}", dir.display());

        Ok(Self {
            dir,
            next_index: 0,
            width,
            height,
        })
    }
}

impl OutputSink for ImageSequenceOutput {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        anyhow::ensure!(
            frame.dimensions() == (self.width, self.height),
            "Frame is {:?}, output expects {}x{}",
            frame.dimensions(),
            self.width,
            self.height
        );

        let path = self.dir.join(format!("frame_{:06}.png", self.next_index));
        frame
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.next_index += 1;
        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
