//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// A real-time terminal spectrum meter with logarithmic bands and peak hold
#[derive(Parser, Debug)]
#[command(name = "pipespectrum")]
#[command(version)]
#[command(about = "Real-time terminal spectrum meter with logarithmic bands and peak hold")]
#[command(long_about = "Real-time terminal spectrum meter with logarithmic bands and peak hold.\n\nCaptures an audio input device, splits it into logarithmically spaced\nfrequency bands and draws them as bars with falling peak caps.\n\nDEFAULT COMMAND:\n    If no command is specified, 'run' is used by default.\n\nKEYS:\n    p           Toggle peak caps\n    q, Esc      Quit\n\nEXAMPLES:\n    # Start the meter on the default input device\n    $ pipespectrum\n\n    # Use a different configuration file\n    $ pipespectrum --config ./studio.toml\n\n    # Find the device to put in the config file\n    $ pipespectrum list-devices\n\n    # Write the default configuration without opening an editor\n    $ pipespectrum config --init")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/pipespectrum/pipespectrum.toml\n    Logs:               ~/.local/state/pipespectrum/pipespectrum.log.*"
)]
struct Cli {
    /// Read configuration from FILE instead of the default location
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Show the live spectrum meter (default)
    ///
    /// Press 'p' to toggle peak caps, Escape/q to quit.
    #[command(visible_alias = "r")]
    Run,

    /// Open configuration file in your preferred editor
    ///
    /// Creates the file from the commented default template if it does not
    /// exist. Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config {
        /// Only write the default file; do not open an editor
        #[arg(long)]
        init: bool,
    },

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in pipespectrum.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   pipespectrum completions bash > pipespectrum.bash
    ///   pipespectrum completions zsh > _pipespectrum
    ///   pipespectrum completions fish > pipespectrum.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "pipespectrum", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    let config_path = cli.config.as_deref();
    match cli.command {
        None | Some(Commands::Run) => commands::handle_run(config_path).await?,
        Some(Commands::Config { init }) => commands::handle_config(config_path, init)?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
