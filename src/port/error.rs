//! Port-specific error types.
//!
//! Device-level failures are kept apart from controller-level errors. The
//! workers use [`PortError::is_transient`] to tell a read timeout (retry) from
//! a failure that ends the link.

use std::io::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration was rejected by the driver.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a Timeout error from a duration.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout(duration)
    }

    /// Whether the operation may simply be retried.
    ///
    /// A read that ran into the device timeout is expected on an idle line and
    /// does not end the link.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortError::not_found("/dev/ttyUSB0");
        assert_eq!(err.to_string(), "Serial port not found: /dev/ttyUSB0");

        let err = PortError::config("Invalid baud rate");
        assert_eq!(err.to_string(), "Configuration error: Invalid baud rate");
    }

    #[test]
    fn test_timeout_error() {
        let err = PortError::timeout(Duration::from_millis(500));
        assert!(err.to_string().contains("500ms"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_io_timeouts_are_transient() {
        for kind in [ErrorKind::TimedOut, ErrorKind::WouldBlock, ErrorKind::Interrupted] {
            let err = PortError::Io(std::io::Error::new(kind, "idle"));
            assert!(err.is_transient(), "{kind:?} should be transient");
        }
    }

    #[test]
    fn test_other_errors_are_fatal() {
        let err = PortError::Io(std::io::Error::new(ErrorKind::BrokenPipe, "unplugged"));
        assert!(!err.is_transient());
        assert!(!PortError::not_found("COM3").is_transient());
    }
}
