//! Configuration schema definitions.
//!
//! Mirrors the TOML file layout. Durations are stored as milliseconds and
//! turned into a [`ConnectionConfig`] once validated.

use super::error::{ConfigError, ConfigResult};
use crate::controller::{ConnectionConfig, DEFAULT_READ_TIMEOUT, DEFAULT_WRITER_POLL};
use crate::framing::FramingMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial link settings
    pub link: LinkConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Serial link section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Device path or name, e.g. "/dev/ttyUSB0" or "COM3"
    pub device: String,
    /// Baud rate; the frame is always 8-N-1
    pub baud_rate: u32,
    /// "binary" or "text"
    pub mode: FramingMode,
    /// Pause before opening the device, 0 for none
    pub startup_delay_ms: u64,
    /// Device read timeout
    pub read_timeout_ms: u64,
    /// Longest an idle transmitter waits between shutdown checks
    pub writer_poll_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device: default_device().to_string(),
            baud_rate: 9600,
            mode: FramingMode::Text,
            startup_delay_ms: 0,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            writer_poll_ms: DEFAULT_WRITER_POLL.as_millis() as u64,
        }
    }
}

fn default_device() -> &'static str {
    if cfg!(windows) {
        "COM3"
    } else {
        "/dev/ttyUSB0"
    }
}

impl LinkConfig {
    /// Reject settings no device could be opened with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.device.trim().is_empty() {
            return Err(ConfigError::invalid("link.device", "must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::invalid("link.baud_rate", "must be greater than zero"));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::invalid("link.read_timeout_ms", "must be greater than zero"));
        }
        if self.writer_poll_ms == 0 {
            return Err(ConfigError::invalid("link.writer_poll_ms", "must be greater than zero"));
        }
        Ok(())
    }

    /// Validate and build the immutable settings for a controller.
    pub fn connection(&self) -> ConfigResult<ConnectionConfig> {
        self.validate()?;
        let mut config = ConnectionConfig::new(self.device.trim(), self.baud_rate)
            .with_mode(self.mode)
            .with_read_timeout(Duration::from_millis(self.read_timeout_ms))
            .with_writer_poll(Duration::from_millis(self.writer_poll_ms));
        if self.startup_delay_ms > 0 {
            config = config.with_startup_delay(Duration::from_millis(self.startup_delay_ms));
        }
        Ok(config)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "serial_link=trace"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}
