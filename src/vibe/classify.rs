use super::error::Result;
use super::frame::Frame;
use super::samples::Sample;
use super::Model;

/// Rise in normalized global score treated as camera motion
pub const SCENE_CHANGE_THRESHOLD: f64 = 0.1;

/// Score written everywhere after a scene change
pub const NEUTRAL_SCORE: u8 = 127;

/// Weighted squared-distance test against an axis-aligned ellipsoid with
/// radii `(sigma_y, sigma_u, sigma_v)`, cross-multiplied so it stays in
/// integers: `dy²·σu²σv² + du²·σv²σy² + dv²·σy²σu² < σy²σu²σv²`.
///
/// A zero radius pins that channel to an exact match and drops it from the
/// product terms.
#[derive(Debug, Clone, Copy)]
struct ConsensusTest {
    weights: [u64; 3],
    limit: u64,
    exact: [bool; 3],
}

impl ConsensusTest {
    fn new(sigmas: [u8; 3]) -> Self {
        let sq = sigmas.map(|s| if s == 0 { 1 } else { (s as u64) * (s as u64) });
        Self {
            weights: [sq[1] * sq[2], sq[2] * sq[0], sq[0] * sq[1]],
            limit: sq[0] * sq[1] * sq[2],
            exact: sigmas.map(|s| s == 0),
        }
    }

    #[inline]
    fn matches(&self, sample: &Sample, colour: &[u8; 3]) -> bool {
        let mut dist = 0u64;
        for c in 0..3 {
            let d = sample[c] as i64 - colour[c] as i64;
            if self.exact[c] {
                if d != 0 {
                    return false;
                }
                continue;
            }
            dist += (d * d) as u64 * self.weights[c];
        }
        dist < self.limit
    }

    fn count(&self, samples: &[Sample], colour: &[u8; 3]) -> usize {
        samples.iter().filter(|s| self.matches(s, colour)).count()
    }
}

/// Foreground score for a pixel with `card` matching samples.
///
/// 127 at `card == cardinality` regardless of confidence; confidence stretches
/// the score towards 0 (many matches) or 255 (few matches).
#[inline]
fn score(confidence: u8, card: usize, cardinality: usize) -> u8 {
    let conf = confidence as i32;
    let twice = 2 * cardinality as i32;
    let s = conf * (twice - card as i32) / twice + 127 - conf / 2;
    s.clamp(0, 255) as u8
}

impl Model {
    /// Score every pixel of `frame` into its score channel and return the
    /// normalized global score in `[0, 1]`.
    ///
    /// If the global score jumps by more than [`SCENE_CHANGE_THRESHOLD`] since
    /// the previous call, all confidence is discarded, every score is set to
    /// [`NEUTRAL_SCORE`] and 0.5 is returned.
    pub fn classify(&mut self, frame: &mut Frame) -> Result<f64> {
        frame.ensure_dims(self.width, self.height)?;
        let _span = tracing::debug_span!("classify").entered();

        let test = ConsensusTest::new(self.sigmas());
        let mut total: u64 = 0;

        for y in 0..self.height {
            for x in 0..self.width {
                let colour = frame.colour(x, y);
                let card = test.count(self.samples.pixel(y * self.width + x), &colour);
                let s = score(self.confidence[[y, x]], card, self.cardinality);
                frame.set_score(x, y, s);
                total += s as u64;
            }
        }

        let mut normalized = total as f64 / ((self.width * self.height) as f64 * 255.0);

        if normalized - self.lastscore > SCENE_CHANGE_THRESHOLD {
            tracing::info!(
                "Scene change: global score {:.3} -> {:.3}, resetting confidence",
                self.lastscore,
                normalized
            );
            self.confidence.fill(0);
            frame.fill_score(NEUTRAL_SCORE);
            normalized = 0.5;
        }

        tracing::debug!("Global score {:.4}", normalized);
        self.lastscore = normalized;
        Ok(normalized)
    }
}
