//! Why a configuration could not be turned into link settings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `origin` is the file path, or `<inline>` for text parsed directly.
    #[error("{origin} is not a valid link configuration: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed but cannot drive a device, e.g. a zero baud rate.
    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },

    /// An environment override could not be parsed.
    #[error("{var}={value:?} is not {expected}")]
    BadOverride {
        var: String,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_override(var: String, value: String, expected: &'static str) -> Self {
        Self::BadOverride { var, value, expected }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
