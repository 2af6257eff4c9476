//! Core traits for serial port abstraction.
//!
//! Defines the `SerialPortAdapter` trait that lets real serial ports and the
//! mock be driven by the same workers, plus the `DeviceOpener` seam the
//! controller uses to obtain a handle.

use super::error::PortError;
use std::sync::Arc;
use std::time::Duration;

/// Parameters used when opening a device.
///
/// The frame is fixed at 8 data bits, no parity, one stop bit and no flow
/// control; only the speed and read timeout vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Read/write timeout. Bounds how long a worker can stay blocked in the
    /// device after the link has been stopped.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Trait for serial port I/O operations.
///
/// Implemented by [`SyncSerialPort`](super::SyncSerialPort) for hardware and
/// [`MockSerialPort`](super::MockSerialPort) for tests.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// `Ok(0)` means the stream has ended.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Set the read/write timeout for this port.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Create a second handle to the same open device.
    ///
    /// The receive and transmit workers each own one so that a blocked read
    /// never holds up a write.
    fn try_clone_adapter(&self) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}

/// Opens a device by name. Called once per controller, on the receive worker.
pub type DeviceOpener =
    Arc<dyn Fn(&str, PortConfiguration) -> Result<Box<dyn SerialPortAdapter>, PortError> + Send + Sync>;
