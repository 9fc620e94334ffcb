//! Resolved analyzer parameters.

use super::error::ConfigError;

/// Immutable parameters for a [`SpectrumAnalyzer`](super::SpectrumAnalyzer).
///
/// Built from the user-facing settings file and checked with
/// [`SpectralConfig::validate`] before any buffer is allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralConfig {
    /// Analysis window length in samples (even)
    pub fft_size: usize,
    /// Input sample rate in Hz
    pub sample_rate: u32,
    /// Number of logarithmic output bands
    pub num_bands: usize,
    /// Lower edge of the first band in Hz
    pub min_freq: f32,
    /// Upper edge of the last band in Hz
    pub max_freq: f32,
    /// Level mapped to 0.0
    pub min_db: f32,
    /// Level mapped to 1.0
    pub max_db: f32,
    /// Normalized levels below this are forced to 0
    pub noise_threshold: f32,
    /// Apply the high-frequency compensation curve
    pub freq_weighting: bool,
    /// Weight of the previous level in the moving average, in [0, 1)
    pub smoothing_factor: f32,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            fft_size: 8192,
            sample_rate: 48000,
            num_bands: 64,
            min_freq: 20.0,
            max_freq: 20000.0,
            min_db: -80.0,
            max_db: 0.0,
            noise_threshold: 0.05,
            freq_weighting: true,
            smoothing_factor: 0.7,
        }
    }
}

impl SpectralConfig {
    /// Checks every invariant the analyzer relies on.
    ///
    /// Comparisons are written so that NaN fails them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fft_size < 2 || self.fft_size % 2 != 0 {
            return Err(ConfigError::InvalidFftSize(self.fft_size));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.num_bands == 0 {
            return Err(ConfigError::InvalidBandCount(self.num_bands));
        }
        if !(self.min_freq > 0.0 && self.min_freq < self.max_freq) {
            return Err(ConfigError::InvalidFrequencyRange {
                min: self.min_freq,
                max: self.max_freq,
            });
        }
        let nyquist = self.nyquist();
        if !(self.max_freq < nyquist) {
            return Err(ConfigError::FrequencyAboveNyquist {
                max_freq: self.max_freq,
                nyquist,
            });
        }
        if !(self.min_db < self.max_db) {
            return Err(ConfigError::InvalidDbRange {
                min: self.min_db,
                max: self.max_db,
            });
        }
        if !(0.0..1.0).contains(&self.smoothing_factor) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing_factor));
        }
        if !(0.0..=1.0).contains(&self.noise_threshold) {
            return Err(ConfigError::InvalidNoiseThreshold(self.noise_threshold));
        }
        Ok(())
    }

    /// Half the sample rate.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate as f32 * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SpectralConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_fft_size() {
        for size in [0, 1, 7, 1023] {
            let config = SpectralConfig {
                fft_size: size,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidFftSize(size)));
        }
    }

    #[test]
    fn test_rejects_zero_rate_and_bands() {
        let config = SpectralConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSampleRate(0)));

        let config = SpectralConfig {
            num_bands: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidBandCount(0)));
    }

    #[test]
    fn test_rejects_inverted_frequency_range() {
        let config = SpectralConfig {
            min_freq: 500.0,
            max_freq: 500.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrequencyRange { .. })
        ));

        let config = SpectralConfig {
            min_freq: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrequencyRange { .. })
        ));
    }

    #[test]
    fn test_rejects_max_freq_at_nyquist() {
        let config = SpectralConfig {
            sample_rate: 16000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FrequencyAboveNyquist { .. })
        ));
    }

    #[test]
    fn test_smoothing_bounds() {
        let mut config = SpectralConfig {
            smoothing_factor: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.smoothing_factor = 1.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSmoothing(1.0)));

        config.smoothing_factor = -0.1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSmoothing(-0.1)));
    }

    #[test]
    fn test_rejects_nan_inputs() {
        let config = SpectralConfig {
            min_db: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDbRange { .. })
        ));

        let config = SpectralConfig {
            noise_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNoiseThreshold(_))
        ));
    }
}
