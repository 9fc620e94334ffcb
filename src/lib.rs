//! Real-time spectrum analysis for terminal meters.
//!
//! [`analysis`] is the engine: it turns interleaved stereo samples into
//! smoothed logarithmic band levels with falling peaks and can be shared
//! between an audio callback and a render loop. The remaining modules wire it
//! to a cpal input device and a ratatui display.

pub mod analysis;
pub mod app;
pub mod capture;
pub mod commands;
pub mod config;
pub mod logging;
pub mod meter;
