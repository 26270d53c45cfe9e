use super::error::Result;
use super::frame::Frame;
use super::Model;
use std::sync::OnceLock;

/// Steepness of the `expt` curve
const EXPT_CURVE: f64 = 5.0;

/// 256-entry exponential ramp from 0 to 255, built on first use.
///
/// Maps `score·confidence/255` to a replacement period multiplier so that only
/// pixels that are both foreground and trusted stretch the period noticeably.
pub fn expt() -> &'static [u8; 256] {
    static EXPT: OnceLock<[u8; 256]> = OnceLock::new();
    EXPT.get_or_init(|| {
        let denom = EXPT_CURVE.exp_m1();
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let x = i as f64 / 255.0;
            *entry = (255.0 * (EXPT_CURVE * x).exp_m1() / denom).round() as u8;
        }
        table
    })
}

impl Model {
    /// Refresh samples and confidence from the scores `classify` just wrote
    /// into `frame`.
    ///
    /// Each pixel draws a replacement period `t` from its score and
    /// confidence. With probability `1/t` (always when `t < 2`) one random
    /// sample slot is overwritten with the current colour and confidence rises
    /// by `cinc_bg`; otherwise confidence falls by `cdec_fg`.
    pub fn update(&mut self, frame: &Frame) -> Result<()> {
        frame.ensure_dims(self.width, self.height)?;
        let _span = tracing::debug_span!("update").entered();

        let table = expt();
        let lspeed_fg = self.params.lspeed_fg;
        let lspeed_bg = self.params.lspeed_bg;
        let mut refreshed = 0usize;

        for y in 0..self.height {
            for x in 0..self.width {
                let conf = self.confidence[[y, x]];
                let index = frame.score(x, y) as usize * conf as usize / 255;
                let t = (table[index] as u32).saturating_mul(lspeed_fg) / 255;
                let t = t.saturating_add(lspeed_bg);

                if t < 2 || self.rng.next_mod(t) == 0 {
                    self.refresh(x, y, frame.colour(x, y));
                    refreshed += 1;
                } else {
                    self.confidence[[y, x]] = conf.saturating_sub(self.params.cdec_fg);
                }
            }
        }

        tracing::debug!(
            "Refreshed {} of {} pixels",
            refreshed,
            self.width * self.height
        );
        Ok(())
    }

    /// Warm-up variant of [`update`](Self::update): every pixel takes the
    /// refresh branch regardless of its score.
    pub fn update_forced(&mut self, frame: &Frame) -> Result<()> {
        frame.ensure_dims(self.width, self.height)?;
        let _span = tracing::debug_span!("update_forced").entered();

        for y in 0..self.height {
            for x in 0..self.width {
                self.refresh(x, y, frame.colour(x, y));
            }
        }
        Ok(())
    }

    #[inline]
    fn refresh(&mut self, x: usize, y: usize, colour: [u8; 3]) {
        let slot = self.rng.next_mod(self.params.nsamples as u32) as usize;
        self.samples.pixel_mut(y * self.width + x)[slot] = colour;
        let conf = &mut self.confidence[[y, x]];
        *conf = conf.saturating_add(self.params.cinc_bg);
    }
}
