//! Analyzer construction errors

use thiserror::Error;

/// Errors raised while validating a [`SpectralConfig`](super::SpectralConfig).
///
/// These only occur at construction. Once an analyzer exists there is no
/// runtime error path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// FFT size must be a positive even number of samples
    #[error("FFT size must be a positive even number, got {0}")]
    InvalidFftSize(usize),

    /// Sample rate must be positive
    #[error("Sample rate must be positive, got {0}Hz")]
    InvalidSampleRate(u32),

    /// At least one band is required
    #[error("Band count must be positive, got {0}")]
    InvalidBandCount(usize),

    /// Frequency range must satisfy 0 < min < max
    #[error("Invalid frequency range: min={min}Hz, max={max}Hz")]
    InvalidFrequencyRange { min: f32, max: f32 },

    /// Upper band edge must stay below the Nyquist frequency
    #[error("Max frequency {max_freq}Hz must be below Nyquist ({nyquist}Hz)")]
    FrequencyAboveNyquist { max_freq: f32, nyquist: f32 },

    /// dB window must satisfy min < max
    #[error("Invalid dB range: min={min}dB, max={max}dB")]
    InvalidDbRange { min: f32, max: f32 },

    /// Smoothing factor must lie in [0, 1)
    #[error("Smoothing factor must be in [0, 1), got {0}")]
    InvalidSmoothing(f32),

    /// Noise gate threshold must lie in [0, 1]
    #[error("Noise threshold must be in [0, 1], got {0}")]
    InvalidNoiseThreshold(f32),

    /// Peak fall time must be positive
    #[error("Peak fall time must be positive, got {0}s")]
    InvalidPeakFallTime(f32),

    /// Render frame rate must be positive
    #[error("Frame rate must be positive, got {0}")]
    InvalidFrameRate(u32),
}
