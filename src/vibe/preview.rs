use super::error::Result;
use super::frame::Frame;
use super::Model;

impl Model {
    /// Write the per-pixel mean of the stored samples into `frame`'s colour
    /// channels. Scores and model state are left untouched.
    pub fn preview_into(&self, frame: &mut Frame) -> Result<()> {
        frame.ensure_dims(self.width, self.height)?;

        for y in 0..self.height {
            for x in 0..self.width {
                frame.set_colour(x, y, self.samples.mean(y * self.width + x));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::vibe::{ChannelLayout, Frame, Model, ModelParams};

    #[test]
    fn preview_shows_sample_mean_without_mutating() {
        let params = ModelParams {
            nsamples: 4,
            sigma_y: 0,
            sigma_u: 0,
            sigma_v: 0,
            seed: Some(8),
            ..Default::default()
        };
        let mut model = Model::with_params(2, 2, &params).unwrap();

        let mut seed = vec![0u8; 16];
        for px in seed.chunks_exact_mut(4) {
            px.copy_from_slice(&[0, 40, 80, 120]);
        }
        model
            .init_model(&Frame::packed(&mut seed, 2, 2, ChannelLayout::AYUV).unwrap())
            .unwrap();
        let confidence = model.confidence().to_owned();
        let samples: Vec<_> = (0..4).map(|p| model.samples().pixel(p).to_vec()).collect();

        let mut out = vec![9u8; 16];
        let mut frame = Frame::packed(&mut out, 2, 2, ChannelLayout::AYUV).unwrap();
        model.preview_into(&mut frame).unwrap();
        assert_eq!(frame.colour(1, 1), [40, 80, 120]);
        assert_eq!(frame.score(1, 1), 9);

        assert_eq!(model.confidence(), confidence);
        for (p, s) in samples.iter().enumerate() {
            assert_eq!(model.samples().pixel(p), s.as_slice());
        }
    }

    #[test]
    fn preview_checks_dimensions() {
        let model = Model::create(2, 2, 3).unwrap();
        let mut out = vec![0u8; 4 * 3];
        let mut frame = Frame::packed(&mut out, 3, 1, ChannelLayout::AYUV).unwrap();
        assert!(model.preview_into(&mut frame).is_err());
    }
}
