//! Hardware serial port backed by the `serialport` crate.

use super::error::PortError;
use super::traits::{DeviceOpener, PortConfiguration, SerialPortAdapter};
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

/// Synchronous serial port implementation wrapping `serialport::SerialPort`.
pub struct SyncSerialPort {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl SyncSerialPort {
    /// Open a serial port at the given speed with an 8-N-1 frame and no flow
    /// control.
    ///
    /// # Example
    /// ```no_run
    /// use serial_link::port::{PortConfiguration, SyncSerialPort};
    ///
    /// let port = SyncSerialPort::open("/dev/ttyUSB0", PortConfiguration::default())?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port_name: &str, config: PortConfiguration) -> Result<Self, PortError> {
        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self {
            port,
            name: port_name.to_string(),
        })
    }

    /// The opener used by controllers unless a test injects another one.
    pub fn opener() -> DeviceOpener {
        Arc::new(|name: &str, config: PortConfiguration| {
            Self::open(name, config).map(|port| Box::new(port) as Box<dyn SerialPortAdapter>)
        })
    }
}

impl SerialPortAdapter for SyncSerialPort {
    /// Either the whole buffer reaches the driver or this fails; a short
    /// write surfaces as `ErrorKind::WriteZero`.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.port.write_all(data)?;
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        self.port.read(buffer).map_err(PortError::Io)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.port.set_timeout(timeout).map_err(PortError::Serial)
    }

    fn try_clone_adapter(&self) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        let port = self.port.try_clone()?;
        Ok(Box::new(Self {
            port,
            name: self.name.clone(),
        }))
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_device_fails_to_open() {
        let result = SyncSerialPort::open("/dev/nonexistent_port_12345", PortConfiguration::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_opener_reports_missing_device() {
        let opener = SyncSerialPort::opener();
        assert!(opener("/dev/nonexistent_port_12345", PortConfiguration::default()).is_err());
    }
}
