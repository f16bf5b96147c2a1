//! Application configuration for the serialvis binary.
//!
//! Loaded from a TOML file; every field has a default so a missing file or
//! a sparse one still yields a working demo setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::decode::{Endianness, SampleFormat};
use crate::error::{Result, SerialVisError};

/// Which reader frames the incoming data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderKind {
    /// Built-in signal generator, no hardware needed.
    #[default]
    Demo,
    /// Fixed-width binary frames.
    Binary,
    /// Delimiter-separated text lines.
    Ascii,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Retained samples per channel.
    pub window_size: usize,
    /// Channel count for readers that don't detect it from the stream.
    pub channels: usize,
    pub reader: ReaderKind,
    /// Serial device path; the demo reader runs without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub baud_rate: u32,
    /// Sample format for the binary reader.
    pub format: SampleFormat,
    pub endianness: Endianness,
    /// Field delimiter for the ASCII reader.
    pub delimiter: char,
    /// Demo generator tick interval in milliseconds.
    pub demo_interval_ms: u64,
    /// CSV file to record into, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PathBuf>,
    /// Prepend wall-clock timestamps to recorded rows.
    pub record_timestamp: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_size: 10_000,
            channels: 1,
            reader: ReaderKind::Demo,
            port: None,
            baud_rate: 9600,
            format: SampleFormat::U8,
            endianness: Endianness::Little,
            delimiter: ',',
            demo_interval_ms: 100,
            record: None,
            record_timestamp: false,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&text).map_err(|e| SerialVisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text =
            toml::to_string_pretty(self).map_err(|e| SerialVisError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(SerialVisError::Config(
                "window_size must be nonzero".to_string(),
            ));
        }
        if self.channels == 0 && self.reader != ReaderKind::Ascii {
            return Err(SerialVisError::Config(
                "channels must be nonzero (the ascii reader detects it instead)".to_string(),
            ));
        }
        if self.reader != ReaderKind::Demo && self.port.is_none() {
            return Err(SerialVisError::Config(format!(
                "reader {:?} needs a serial port",
                self.reader
            )));
        }
        Ok(())
    }
}
