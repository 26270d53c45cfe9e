use super::error::{ModelError, Result};

/// Tunables for a [`Model`](super::Model).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    /// Colour samples kept per pixel (1..=255)
    pub nsamples: usize,

    /// Per-channel match radius. Zero demands an exact match on that channel.
    pub sigma_y: u8,
    pub sigma_u: u8,
    pub sigma_v: u8,

    /// Extra replacement period granted to confident foreground
    pub lspeed_fg: u32,
    /// Base replacement period for every pixel
    pub lspeed_bg: u32,

    /// Confidence gained when a pixel refreshes a sample
    pub cinc_bg: u8,
    /// Confidence lost when it doesn't
    pub cdec_fg: u8,

    /// Seed for the replacement ring; `None` draws one from OS entropy
    pub seed: Option<u64>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            nsamples: 20,
            sigma_y: 20,
            sigma_u: 8,
            sigma_v: 8,
            lspeed_fg: 128,
            lspeed_bg: 4,
            cinc_bg: 16,
            cdec_fg: 8,
            seed: None,
        }
    }
}

impl ModelParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.nsamples == 0 || self.nsamples > u8::MAX as usize {
            return Err(ModelError::Configuration(format!(
                "nsamples must be in 1..=255, got {}",
                self.nsamples
            )));
        }
        Ok(())
    }

    /// Minimum number of matching samples for a background-dominant pixel
    pub fn cardinality(&self) -> usize {
        (self.nsamples / 3).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_is_a_third() {
        let params = ModelParams {
            nsamples: 20,
            ..Default::default()
        };
        assert_eq!(params.cardinality(), 6);
    }

    #[test]
    fn cardinality_never_zero() {
        let params = ModelParams {
            nsamples: 2,
            ..Default::default()
        };
        assert_eq!(params.cardinality(), 1);
    }

    #[test]
    fn nsamples_range() {
        for n in [0usize, 256, 1000] {
            let params = ModelParams {
                nsamples: n,
                ..Default::default()
            };
            assert!(matches!(
                params.validate(),
                Err(ModelError::Configuration(_))
            ));
        }
        assert!(ModelParams::default().validate().is_ok());
    }
}
