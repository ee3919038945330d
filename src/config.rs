//! Configuration module for Pomodoro settings
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_AUDIO_FILE: &str = "alert.mp3";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config format in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Settings for one session. Every duration and the cycle count are
/// strictly positive; the audio file is only checked when it is played.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub work_minutes: NonZeroU32,
    pub short_break_minutes: NonZeroU32,
    pub long_break_minutes: NonZeroU32,
    pub total_cycles: NonZeroU32,
    pub audio_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_minutes: positive(25),
            short_break_minutes: positive(5),
            long_break_minutes: positive(15),
            total_cycles: positive(4),
            audio_path: PathBuf::from(DEFAULT_AUDIO_FILE),
        }
    }
}

const fn positive(value: u32) -> NonZeroU32 {
    match NonZeroU32::new(value) {
        Some(value) => value,
        None => panic!("default must be positive"),
    }
}

impl Config {
    /// Reads a JSON settings file. Missing keys fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `config_path`, using the built-in defaults when the file is
    /// absent or unusable.
    pub fn load_or_default(config_path: &Path) -> Self {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Self::default();
        }

        match Self::load(config_path) {
            Ok(config) => {
                tracing::info!(path = %config_path.display(), "loaded config file");
                config
            }
            Err(err) => {
                tracing::warn!(error = %err, "falling back to default settings");
                eprintln!("Warning: {err}, using defaults");
                Self::default()
            }
        }
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home)
            .join(".config")
            .join("pomodoro")
            .join("config.json")
    } else {
        PathBuf::from("pomodoro-config.json")
    }
}
