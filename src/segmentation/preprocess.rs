use super::types::Matte;
use crate::vibe::{self, ChannelLayout, Frame};
use image::{imageops, GrayImage, RgbImage};

/// Row alignment of the packed AYUV buffer, in bytes
const ROW_ALIGN: usize = 64;

/// Converts RGB frames into the packed, row-padded AYUV layout the background
/// model reads, and model output back into images.
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
    stride: usize,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        let row_bytes = target_width as usize * ChannelLayout::AYUV.channels;
        Self {
            target_width,
            target_height,
            stride: row_bytes.div_ceil(ROW_ALIGN) * ROW_ALIGN,
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes needed to hold one packed frame
    pub fn buffer_len(&self) -> usize {
        self.stride * self.target_height as usize
    }

    /// Pack an RGB image into `buf` as AYUV with a zeroed score byte
    ///
    /// Steps:
    /// 1. Resize to target dimensions
    /// 2. Convert each pixel to YUV
    /// 3. Lay rows out `stride` bytes apart
    pub fn preprocess(&self, image: &RgbImage, buf: &mut Vec<u8>) {
        let _span = tracing::debug_span!("preprocess").entered();

        // Resize if needed
        let resized;
        let image = if image.dimensions() != (self.target_width, self.target_height) {
            resized = imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Triangle,
            );
            &resized
        } else {
            image
        };

        buf.clear();
        buf.resize(self.buffer_len(), 0);

        let layout = ChannelLayout::AYUV;
        for (x, y, pixel) in image.enumerate_pixels() {
            let i = y as usize * self.stride + x as usize * layout.channels;
            let (py, pu, pv) = rgb_to_yuv(pixel[0], pixel[1], pixel[2]);
            buf[i + layout.y] = py;
            buf[i + layout.u] = pu;
            buf[i + layout.v] = pv;
        }
    }

    /// View a buffer filled by [`preprocess`](Self::preprocess) as a model frame
    pub fn frame<'a>(&self, buf: &'a mut [u8]) -> vibe::Result<Frame<'a>> {
        Frame::new(
            buf,
            self.target_width as usize,
            self.target_height as usize,
            self.stride,
            ChannelLayout::AYUV,
        )
    }

    /// Lift the luma plane out of a frame, e.g. after the scores have been
    /// copied into it with [`Frame::copy_score_to`]
    pub fn luma_matte(frame: &Frame) -> Matte {
        GrayImage::from_fn(frame.width() as u32, frame.height() as u32, |x, y| {
            image::Luma([frame.colour(x as usize, y as usize)[0]])
        })
    }

    /// Scale a matte at model resolution back to the frame's resolution
    pub fn postprocess_matte(matte: Matte, target_width: u32, target_height: u32) -> Matte {
        let _span = tracing::debug_span!("postprocess").entered();

        // If dimensions match, no resize needed
        if matte.dimensions() == (target_width, target_height) {
            return matte;
        }

        imageops::resize(
            &matte,
            target_width,
            target_height,
            imageops::FilterType::Triangle,
        )
    }

    /// Convert matte to grayscale RGB image for visualization
    pub fn matte_to_rgb(matte: &Matte) -> RgbImage {
        RgbImage::from_fn(matte.width(), matte.height(), |x, y| {
            let value = matte.get_pixel(x, y)[0];
            image::Rgb([value, value, value])
        })
    }

    /// Convert the colour channels of a frame back to RGB
    pub fn frame_to_rgb(frame: &Frame) -> RgbImage {
        RgbImage::from_fn(frame.width() as u32, frame.height() as u32, |x, y| {
            let [py, pu, pv] = frame.colour(x as usize, y as usize);
            let (r, g, b) = yuv_to_rgb(py, pu, pv);
            image::Rgb([r, g, b])
        })
    }
}

/// Convert RGB to YUV color space
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as f32;
    let g = g as f32;
    let b = b as f32;

    let y = (0.299 * r + 0.587 * g + 0.114 * b).clamp(0.0, 255.0) as u8;
    let u = ((-0.147 * r - 0.289 * g + 0.436 * b) + 128.0).clamp(0.0, 255.0) as u8;
    let v = ((0.615 * r - 0.515 * g - 0.100 * b) + 128.0).clamp(0.0, 255.0) as u8;

    (y, u, v)
}

/// Inverse of [`rgb_to_yuv`]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.140 * v).round().clamp(0.0, 255.0) as u8;
    let g = (y - 0.395 * u - 0.581 * v).round().clamp(0.0, 255.0) as u8;
    let b = (y + 2.032 * u).round().clamp(0.0, 255.0) as u8;

    (r, g, b)
}
