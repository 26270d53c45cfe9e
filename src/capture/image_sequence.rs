use super::CaptureSource;
use anyhow::{Context, Result};
use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Replays a directory of still images, in file-name order, as a stream
pub struct ImageSequenceCapture {
    pending: VecDeque<PathBuf>,
    width: u32,
    height: u32,
}

impl ImageSequenceCapture {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Reading image sequence from {}", dir.display());

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?
        {
            let path = entry?.path();
            let known = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if known {
                paths.push(path);
            }
        }
        paths.sort();

        let first = paths
            .first()
            .with_context(|| format!("No images found in {}", dir.display()))?;
        let (width, height) = image::image_dimensions(first)
            .with_context(|| format!("Failed to read {}", first.display()))?;

        tracing::info!("Found {} frames at {}x{}", paths.len(), width, height);

        Ok(Self {
            pending: paths.into(),
            width,
            height,
        })
    }
}

impl CaptureSource for ImageSequenceCapture {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };

        let image = image::open(&path)
            .with_context(|| format!("Failed to decode {}", path.display()))?
            .to_rgb8();

        Ok(Some(image))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
