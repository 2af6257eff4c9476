//! Serial Link Library
//!
//! A non-blocking, thread-based engine for talking to a serial device. A
//! [`Controller`] runs a receive worker and a transmit worker against one
//! device; the application enqueues outbound data and polls inbound queues
//! without ever blocking on the device.
//!
//! # Modules
//!
//! - `port`: device handle trait, hardware port and mock
//! - `queue`: lock-guarded inbound and outbound queues
//! - `lifecycle`: the `initialized` / `closed` flags
//! - `framing`: binary and line receive strategies
//! - `controller`: launch, send, receive and stop
//! - `monitor`: host-side facade with reconnect
//! - `config`: TOML configuration with environment overrides
//! - `logging`: tracing subscriber setup

pub mod config;
pub mod controller;
pub mod error;
pub mod framing;
pub mod lifecycle;
pub mod logging;
pub mod monitor;
pub mod port;
pub mod queue;

mod worker;

pub use config::{Config, ConfigError, ConfigResult, LinkConfig, LogFormat, LoggingConfig};
pub use controller::{ConnectionConfig, Controller};
pub use error::{LinkError, LinkFault};
pub use framing::FramingMode;
pub use monitor::{LinkMonitor, Received};
pub use port::{DeviceOpener, MockSerialPort, PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
