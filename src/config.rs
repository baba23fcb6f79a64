use crate::defaults;
use crate::error::{HoldtypeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub hotkey: HotkeyConfig,
    pub logging: LoggingConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    /// Model name ("base.en") resolved against the model cache,
    /// or an explicit path to a ggml model file.
    pub model: String,
    pub language: String,
}

/// Push-to-talk hotkey configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Key held down while recording, e.g. "F9" or "ctrl+space".
    pub record_key: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console level: "error", "info", or "debug".
    pub level: String,
    /// Optional log file; receives all events regardless of console level.
    pub file: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            record_key: defaults::DEFAULT_RECORD_KEY.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is `ConfigFileNotFound` and invalid TOML is `Config`;
    /// both are startup-fatal for the binary. Missing fields within the
    /// file use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HoldtypeError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                HoldtypeError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - HOLDTYPE_MODEL → stt.model
    /// - HOLDTYPE_RECORD_KEY → hotkey.record_key
    /// - HOLDTYPE_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("HOLDTYPE_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(key) = std::env::var("HOLDTYPE_RECORD_KEY")
            && !key.is_empty()
        {
            self.hotkey.record_key = key;
        }

        if let Ok(device) = std::env::var("HOLDTYPE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/holdtype/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("holdtype")
            .join("config.toml")
    }
}
