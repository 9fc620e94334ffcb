//! Real-time spectral analysis.
//!
//! Interleaved stereo samples are reduced to mono, collected into a
//! half-overlapping Hann-windowed FFT, grouped into logarithmic bands, mapped
//! to a normalized dB scale and smoothed. Peak hold is advanced separately by
//! the render clock.

pub mod analyzer;
pub mod bands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ingest;
pub mod peaks;
pub mod smoothing;
pub mod transform;

pub use analyzer::{SharedAnalyzer, SpectrumAnalyzer, SpectrumSnapshot};
pub use bands::{frequency_weight, BandRange};
pub use config::SpectralConfig;
pub use diagnostics::{AnalysisStats, DiagnosticsHook};
pub use error::ConfigError;
pub use peaks::decay_per_tick;
