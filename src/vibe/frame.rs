use super::error::{ModelError, Result};
use ndarray::{ArrayViewMut3, ShapeBuilder};

/// Which interleaved byte of a pixel holds what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    pub channels: usize,
    pub score: usize,
    pub y: usize,
    pub u: usize,
    pub v: usize,
}

impl ChannelLayout {
    /// Packed AYUV with the foreground score in the alpha byte
    pub const AYUV: ChannelLayout = ChannelLayout {
        channels: 4,
        score: 0,
        y: 1,
        u: 2,
        v: 3,
    };

    fn validate(&self) -> Result<()> {
        if self.channels < 4 {
            return Err(ModelError::InvalidFrame(format!(
                "need at least 4 channels, layout has {}",
                self.channels
            )));
        }

        let offsets = [self.score, self.y, self.u, self.v];
        for (i, &offset) in offsets.iter().enumerate() {
            if offset >= self.channels {
                return Err(ModelError::InvalidFrame(format!(
                    "channel offset {} out of range for {} channels",
                    offset, self.channels
                )));
            }
            if offsets[..i].contains(&offset) {
                return Err(ModelError::InvalidFrame(format!(
                    "channel offset {} assigned twice",
                    offset
                )));
            }
        }

        Ok(())
    }
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self::AYUV
    }
}

/// Borrowed, possibly row-padded, interleaved pixel buffer.
///
/// Internally a `(height, width, channels)` view with strides
/// `(stride, channels, 1)`, so padding bytes at the end of each row are never
/// read or written.
pub struct Frame<'a> {
    pixels: ArrayViewMut3<'a, u8>,
    layout: ChannelLayout,
}

impl<'a> Frame<'a> {
    /// Wrap `data` as a `width`x`height` grid whose rows start `stride` bytes apart.
    pub fn new(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        stride: usize,
        layout: ChannelLayout,
    ) -> Result<Self> {
        layout.validate()?;

        if width == 0 || height == 0 {
            return Err(ModelError::InvalidFrame(format!(
                "empty frame {}x{}",
                width, height
            )));
        }

        let row_bytes = width
            .checked_mul(layout.channels)
            .ok_or_else(|| ModelError::InvalidFrame("row length overflows".into()))?;
        if stride < row_bytes {
            return Err(ModelError::InvalidFrame(format!(
                "stride {} shorter than row of {} bytes",
                stride, row_bytes
            )));
        }

        let needed = (height - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| ModelError::InvalidFrame("buffer length overflows".into()))?;
        if data.len() < needed {
            return Err(ModelError::InvalidFrame(format!(
                "buffer holds {} bytes, {}x{} at stride {} needs {}",
                data.len(),
                width,
                height,
                stride,
                needed
            )));
        }

        let shape = (height, width, layout.channels).strides((stride, layout.channels, 1));
        let pixels = ArrayViewMut3::from_shape(shape, data)
            .map_err(|e| ModelError::InvalidFrame(e.to_string()))?;

        Ok(Self { pixels, layout })
    }

    /// Tightly packed rows (`stride == width * channels`).
    pub fn packed(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        layout: ChannelLayout,
    ) -> Result<Self> {
        Self::new(data, width, height, width.saturating_mul(layout.channels), layout)
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub(crate) fn ensure_dims(&self, width: usize, height: usize) -> Result<()> {
        if self.width() != width || self.height() != height {
            return Err(ModelError::DimensionMismatch {
                expected_width: width,
                expected_height: height,
                actual_width: self.width(),
                actual_height: self.height(),
            });
        }
        Ok(())
    }

    /// (Y, U, V) at column `x`, row `y`
    #[inline]
    pub fn colour(&self, x: usize, y: usize) -> [u8; 3] {
        [
            self.pixels[[y, x, self.layout.y]],
            self.pixels[[y, x, self.layout.u]],
            self.pixels[[y, x, self.layout.v]],
        ]
    }

    #[inline]
    pub fn set_colour(&mut self, x: usize, y: usize, yuv: [u8; 3]) {
        self.pixels[[y, x, self.layout.y]] = yuv[0];
        self.pixels[[y, x, self.layout.u]] = yuv[1];
        self.pixels[[y, x, self.layout.v]] = yuv[2];
    }

    #[inline]
    pub fn score(&self, x: usize, y: usize) -> u8 {
        self.pixels[[y, x, self.layout.score]]
    }

    #[inline]
    pub fn set_score(&mut self, x: usize, y: usize, score: u8) {
        self.pixels[[y, x, self.layout.score]] = score;
    }

    /// Overwrite every score with `value`.
    pub fn fill_score(&mut self, value: u8) {
        let score = self.layout.score;
        self.pixels
            .index_axis_mut(ndarray::Axis(2), score)
            .fill(value);
    }

    /// Copy the score channel into `channel` of every pixel, e.g. to render the
    /// mask into a visible plane.
    pub fn copy_score_to(&mut self, channel: usize) -> Result<()> {
        if channel >= self.layout.channels {
            return Err(ModelError::InvalidFrame(format!(
                "channel {} out of range for {} channels",
                channel, self.layout.channels
            )));
        }

        let score = self.layout.score;
        for mut px in self.pixels.lanes_mut(ndarray::Axis(2)) {
            px[channel] = px[score];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_stride() {
        let mut buf = vec![0u8; 64];
        let err = Frame::new(&mut buf, 4, 2, 12, ChannelLayout::AYUV).err();
        assert!(matches!(err, Some(ModelError::InvalidFrame(_))));
    }

    #[test]
    fn rejects_short_buffer() {
        let mut buf = vec![0u8; 4 * 4 * 3 - 1];
        let err = Frame::packed(&mut buf, 4, 3, ChannelLayout::AYUV).err();
        assert!(matches!(err, Some(ModelError::InvalidFrame(_))));
    }

    #[test]
    fn rejects_three_channel_layout() {
        let layout = ChannelLayout {
            channels: 3,
            score: 0,
            y: 1,
            u: 2,
            v: 0,
        };
        let mut buf = vec![0u8; 48];
        assert!(Frame::packed(&mut buf, 4, 4, layout).is_err());
    }

    #[test]
    fn rejects_duplicate_offsets() {
        let layout = ChannelLayout {
            channels: 4,
            score: 1,
            y: 1,
            u: 2,
            v: 3,
        };
        let mut buf = vec![0u8; 64];
        assert!(Frame::packed(&mut buf, 4, 4, layout).is_err());
    }

    #[test]
    fn last_row_may_omit_padding() {
        // 2 rows of 3 pixels, stride 16: second row only needs 12 bytes
        let mut buf = vec![0u8; 16 + 12];
        assert!(Frame::new(&mut buf, 3, 2, 16, ChannelLayout::AYUV).is_ok());
    }

    #[test]
    fn padded_rows_use_stride() {
        let stride = 20;
        let mut buf = vec![0u8; stride * 2];
        {
            let mut frame = Frame::new(&mut buf, 3, 2, stride, ChannelLayout::AYUV).unwrap();
            frame.set_colour(0, 1, [10, 20, 30]);
            frame.set_score(2, 1, 99);
            assert_eq!(frame.colour(0, 1), [10, 20, 30]);
        }
        assert_eq!(&buf[stride..stride + 4], &[0, 10, 20, 30]);
        assert_eq!(buf[stride + 8], 99);
        // padding untouched
        assert!(buf[12..stride].iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_score_leaves_padding_alone() {
        let stride = 12;
        let mut buf = vec![7u8; stride * 2];
        {
            let mut frame = Frame::new(&mut buf, 2, 2, stride, ChannelLayout::AYUV).unwrap();
            frame.fill_score(127);
        }
        assert_eq!(buf[0], 127);
        assert_eq!(buf[4], 127);
        assert_eq!(buf[stride], 127);
        assert_eq!(&buf[8..12], &[7, 7, 7, 7]);
    }

    #[test]
    fn copy_score_into_luma() {
        let mut buf = vec![0u8; 2 * 4];
        let mut frame = Frame::packed(&mut buf, 2, 1, ChannelLayout::AYUV).unwrap();
        frame.set_score(0, 0, 200);
        frame.set_score(1, 0, 5);
        frame.copy_score_to(1).unwrap();
        assert_eq!(frame.colour(0, 0)[0], 200);
        assert_eq!(frame.colour(1, 0)[0], 5);
        assert!(frame.copy_score_to(4).is_err());
    }
}
