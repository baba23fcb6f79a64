use anyhow::{Context, Result};
use clap::Parser;
use holdtype::app::run_record_command;
use holdtype::audio::device::list_devices;
use holdtype::cli::{Cli, Commands};
use holdtype::config::Config;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_record_command(
                config,
                cli.device,
                cli.model,
                cli.language,
                cli.key,
                cli.quiet,
                cli.verbose,
            )?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
    }

    Ok(())
}

/// Load the configuration file.
///
/// A missing or unparseable file is fatal at startup: the operator gets
/// the error and the process exits before any audio or hotkey setup.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok(config.with_env_overrides())
}

fn list_audio_devices() -> Result<()> {
    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found.");
    } else {
        println!("Available audio input devices:");
        for device in devices {
            println!("  {}", device);
        }
    }
    Ok(())
}
