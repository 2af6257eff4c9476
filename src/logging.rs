//! Tracing subscriber setup for hosts that do not install their own.

use crate::config::{ConfigError, ConfigResult, LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `Ok(false)`
/// if a subscriber was already installed.
pub fn init(config: &LoggingConfig) -> ConfigResult<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::invalid("logging.level", e.to_string()))?,
    };

    let builder = fmt().with_env_filter(filter).with_thread_names(true);
    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    Ok(installed.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_existing_subscriber() {
        let config = LoggingConfig {
            level: "warn".into(),
            format: LogFormat::Compact,
        };
        let _ = init(&config);
        assert!(!init(&config).unwrap());
    }
}
