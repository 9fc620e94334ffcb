//! Application command handlers for pipespectrum.
//!
//! # Commands
//! - `run`: Live spectrum meter (default)
//! - `config`: Create or edit the configuration file
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod run;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use run::handle_run;
