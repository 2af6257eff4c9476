//! Link settings from a TOML file, overridable through `SERIAL_LINK_*`
//! environment variables.
//!
//! [`Config::discover`] uses the first file from [`config_candidates`]; with
//! none present it starts from the defaults, which need no file at all.
//!
//! ```toml
//! [link]
//! device = "/dev/ttyUSB0"
//! baud_rate = 115200
//! mode = "text"
//! startup_delay_ms = 3000
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```
//!
//! ```rust,no_run
//! use serial_link::{Config, Controller};
//!
//! let config = Config::discover()?;
//! let link = Controller::from_config(&config.link)?;
//! link.launch()?;
//! # Ok::<(), serial_link::LinkError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{config_candidates, locate_config, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
pub use schema::{Config, LinkConfig, LogFormat, LoggingConfig};
