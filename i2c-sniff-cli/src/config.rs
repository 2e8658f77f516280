//! Capture configuration loading and parsing
//!
//! The optional config.toml carries the GPIO pin roles and the default
//! log file name, so repeated captures on the same wiring do not need the
//! pin flags every time. Command-line flags override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Capture configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub pins: PinsConfig,
    #[serde(default = "default_logfile")]
    pub logfile: PathBuf,
}

/// GPIO pin assignments
///
/// Defaults match the Raspberry Pi hardware I2C pins: SDA on GPIO 2
/// (header pin 3), SCL on GPIO 3 (header pin 5).
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PinsConfig {
    #[serde(default = "default_sda")]
    pub sda: u8,
    #[serde(default = "default_scl")]
    pub scl: u8,
}

fn default_sda() -> u8 {
    2
}

fn default_scl() -> u8 {
    3
}

fn default_logfile() -> PathBuf {
    PathBuf::from("i2c_log.txt")
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            sda: default_sda(),
            scl: default_scl(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            pins: PinsConfig::default(),
            logfile: default_logfile(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<CaptureConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: CaptureConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
