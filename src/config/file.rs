//! Configuration file management for pipespectrum.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory. Every section and field
//! has a default, so a partial file only needs to name what it changes.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{ConfigError, SpectralConfig};

/// Embedded default configuration template.
pub const DEFAULT_CONFIG: &str = include_str!("../../environments/pipespectrum.toml");

/// RGB color triple as written in the config file.
pub type Rgb = [u8; 3];

/// Spectral analysis and peak hold settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpectrumSettings {
    /// Number of logarithmic bands to display
    pub bands: usize,
    /// Lower edge of the first band in Hz
    pub min_freq: f32,
    /// Upper edge of the last band in Hz (must be below half the sample rate)
    pub max_freq: f32,
    /// FFT window length in samples (even; powers of two are fastest)
    pub fft_size: usize,
    /// Requested capture sample rate in Hz
    pub sample_rate: u32,
    /// Moving average weight of the previous level, 0.0 (none) to just below 1.0
    pub smoothing: f32,
    /// Draw falling peak caps above each bar
    pub peak_hold_enabled: bool,
    /// Seconds for a full-scale peak to fall to zero
    pub peak_fall_time: f32,
    /// Level shown as an empty bar
    pub min_db: f32,
    /// Level shown as a full bar
    pub max_db: f32,
    /// Normalized levels below this are shown as silence (0.0-1.0)
    pub noise_threshold: f32,
    /// Boost higher frequencies with an A-weighting style curve
    pub freq_weighting: bool,
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        let analysis = SpectralConfig::default();
        Self {
            bands: analysis.num_bands,
            min_freq: analysis.min_freq,
            max_freq: analysis.max_freq,
            fft_size: analysis.fft_size,
            sample_rate: analysis.sample_rate,
            smoothing: analysis.smoothing_factor,
            peak_hold_enabled: true,
            peak_fall_time: 1.5,
            min_db: analysis.min_db,
            max_db: analysis.max_db,
            noise_threshold: analysis.noise_threshold,
            freq_weighting: analysis.freq_weighting,
        }
    }
}

impl SpectrumSettings {
    /// Builds the analyzer parameters for the rate the device actually runs at.
    ///
    /// # Errors
    /// - If the resulting parameters are out of range
    pub fn analysis_config(&self, sample_rate: u32) -> Result<SpectralConfig, ConfigError> {
        let config = SpectralConfig {
            fft_size: self.fft_size,
            sample_rate,
            num_bands: self.bands,
            min_freq: self.min_freq,
            max_freq: self.max_freq,
            min_db: self.min_db,
            max_db: self.max_db,
            noise_threshold: self.noise_threshold,
            freq_weighting: self.freq_weighting,
            smoothing_factor: self.smoothing,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Bar colors and layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualizationSettings {
    /// Color of quiet bars
    pub bar_color_low: Rgb,
    /// Color at half scale
    pub bar_color_mid: Rgb,
    /// Color at full scale
    pub bar_color_high: Rgb,
    /// Color of peak caps
    pub peak_color: Rgb,
    /// Empty columns between bars
    pub bar_gap: u16,
    /// Color each cell by its own height instead of the whole bar by its level
    pub bar_gradient: bool,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            bar_color_low: [0, 255, 0],
            bar_color_mid: [255, 255, 0],
            bar_color_high: [255, 0, 0],
            peak_color: [255, 255, 255],
            bar_gap: 1,
            bar_gradient: true,
        }
    }
}

/// Audio capture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `pipespectrum list-devices`
    /// - device name from `pipespectrum list-devices`
    pub device: String,
    /// Requested callback size in frames (0 lets the backend choose)
    pub buffer_size: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            buffer_size: 1024,
        }
    }
}

/// Render loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Target frames per second; also the peak decay clock
    pub frame_rate: u32,
    /// Log analyzer diagnostics every N transforms (0 disables)
    pub diagnostics_interval: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            diagnostics_interval: 10,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipeSpectrumConfig {
    pub spectrum: SpectrumSettings,
    pub visualization: VisualizationSettings,
    pub audio: AudioSettings,
    pub render: RenderSettings,
}

impl PipeSpectrumConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// - If the TOML is malformed or a field has the wrong type
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow!("Invalid configuration: {e}"))
    }

    /// Loads configuration from `path`, or from the user's config directory.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file exists but cannot be read
    /// - If the TOML is malformed
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => get_config_path()?,
        };

        if !config_path.exists() {
            tracing::warn!(
                "Config file {} not found, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", config_path.display()))?;
        let config = Self::parse(&config_content)?;
        tracing::debug!("Configuration loaded from {}", config_path.display());
        Ok(config)
    }

    /// Saves configuration to `path`, creating parent directories.
    ///
    /// # Errors
    /// - If the directory cannot be created
    /// - If the file cannot be written
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Checks the settings that are not covered by the analyzer itself.
    ///
    /// # Errors
    /// - If the peak fall time or frame rate is not positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spectrum.peak_fall_time > 0.0) {
            return Err(ConfigError::InvalidPeakFallTime(
                self.spectrum.peak_fall_time,
            ));
        }
        if self.render.frame_rate == 0 {
            return Err(ConfigError::InvalidFrameRate(self.render.frame_rate));
        }
        Ok(())
    }
}

/// Retrieves the path to the default config file.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".config")
        .join("pipespectrum");

    Ok(config_dir.join("pipespectrum.toml"))
}

/// Writes the commented default template to `path` unless a file exists.
///
/// Returns whether a file was written.
///
/// # Errors
/// - If the directory cannot be created
/// - If the file cannot be written
pub fn write_default_config(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG)?;
    tracing::info!("Default configuration written to {}", path.display());
    Ok(true)
}
