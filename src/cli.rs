//! Command-line interface for holdtype
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Push-to-talk voice transcription for the Linux desktop
#[derive(Parser, Debug)]
#[command(name = "holdtype", version, about = "Push-to-talk voice transcription")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file (default: ~/.config/holdtype/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug-level events)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Audio input device (e.g., pipewire)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Whisper model name or path (default: base.en)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code for transcription (default: en)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Push-to-talk key override, e.g. F9 or ctrl+space
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_no_args() {
        let cli = Cli::parse_from(["holdtype"]);
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from([
            "holdtype",
            "--model",
            "tiny.en",
            "--key",
            "F12",
            "--device",
            "pulse",
            "-v",
        ]);
        assert_eq!(cli.model.as_deref(), Some("tiny.en"));
        assert_eq!(cli.key.as_deref(), Some("F12"));
        assert_eq!(cli.device.as_deref(), Some("pulse"));
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_parses_devices_subcommand() {
        let cli = Cli::parse_from(["holdtype", "devices"]);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
