//! Finding, reading and overriding a [`Config`].

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "serial-link.toml";
/// Names a config file explicitly; checked before any other location.
pub const CONFIG_PATH_ENV: &str = "SERIAL_LINK_CONFIG";
const ENV_PREFIX: &str = "SERIAL_LINK";

/// Applies one override value, or names what the value should have been.
type Override = fn(&mut Config, &str) -> Result<(), &'static str>;

/// `SERIAL_LINK_<suffix>` variables, applied in this order.
const OVERRIDES: &[(&str, Override)] = &[
    ("DEVICE", set_device),
    ("BAUD", set_baud),
    ("MODE", set_mode),
    ("STARTUP_DELAY_MS", set_startup_delay),
    ("READ_TIMEOUT_MS", set_read_timeout),
    ("WRITER_POLL_MS", set_writer_poll),
    ("LOG_LEVEL", set_log_level),
];

fn set_device(config: &mut Config, value: &str) -> Result<(), &'static str> {
    config.link.device = value.to_string();
    Ok(())
}

fn set_baud(config: &mut Config, value: &str) -> Result<(), &'static str> {
    config.link.baud_rate = value.parse().map_err(|_| "a baud rate")?;
    Ok(())
}

fn set_mode(config: &mut Config, value: &str) -> Result<(), &'static str> {
    config.link.mode = value.parse().map_err(|_| "\"binary\" or \"text\"")?;
    Ok(())
}

fn millis(value: &str) -> Result<u64, &'static str> {
    value.parse().map_err(|_| "a whole number of milliseconds")
}

fn set_startup_delay(config: &mut Config, value: &str) -> Result<(), &'static str> {
    config.link.startup_delay_ms = millis(value)?;
    Ok(())
}

fn set_read_timeout(config: &mut Config, value: &str) -> Result<(), &'static str> {
    config.link.read_timeout_ms = millis(value)?;
    Ok(())
}

fn set_writer_poll(config: &mut Config, value: &str) -> Result<(), &'static str> {
    config.link.writer_poll_ms = millis(value)?;
    Ok(())
}

fn set_log_level(config: &mut Config, value: &str) -> Result<(), &'static str> {
    config.logging.level = value.to_string();
    Ok(())
}

/// Places a config file is looked for, most specific first: the file named
/// by `SERIAL_LINK_CONFIG`, `./serial-link.toml`, then the per-user config
/// directory.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
        candidates.push(PathBuf::from(explicit));
    }
    candidates.push(PathBuf::from(CONFIG_FILE_NAME));
    if let Some(dirs) = ProjectDirs::from("", "", "serial-link") {
        candidates.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    candidates
}

/// The first candidate that exists.
pub fn locate_config() -> Option<PathBuf> {
    config_candidates().into_iter().find(|path| path.is_file())
}

impl Config {
    /// Read the first config file found, or start from defaults, then apply
    /// `SERIAL_LINK_*` overrides from the environment.
    pub fn discover() -> ConfigResult<Self> {
        let mut config = match locate_config() {
            Some(path) => {
                debug!(path = %path.display(), "loading link configuration");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Defaults plus environment overrides; no file is read.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Exactly the file's contents over the defaults; the environment is not
    /// consulted.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&text, path.display().to_string())
    }

    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        parse(text, "<inline>".to_string())
    }

    /// Apply every `SERIAL_LINK_*` override that `lookup` knows about.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        for (suffix, apply) in OVERRIDES {
            let var = format!("{ENV_PREFIX}_{suffix}");
            let Some(value) = lookup(&var) else { continue };
            if let Err(expected) = apply(self, value.trim()) {
                return Err(ConfigError::bad_override(var, value, expected));
            }
        }
        Ok(())
    }
}

fn parse(text: &str, origin: String) -> ConfigResult<Config> {
    toml::from_str(text).map_err(|source| ConfigError::Malformed { origin, source })
}
