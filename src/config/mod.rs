//! Configuration management for pipespectrum.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory and resolved into the
//! validated parameters the analyzer and meter run with.

pub mod file;

pub use file::{
    get_config_path, write_default_config, AudioSettings, PipeSpectrumConfig, RenderSettings,
    Rgb, SpectrumSettings, VisualizationSettings,
};
