//! Mock serial port implementation for testing.
//!
//! `MockSerialPort` stands in for a device without hardware. Clones share one
//! state, so a test keeps a handle to feed reads and inspect writes while the
//! workers own their own clones.

use super::error::PortError;
use super::traits::{DeviceOpener, PortConfiguration, SerialPortAdapter};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

/// How long an empty read blocks before reporting a timeout.
const IDLE_READ_BLOCK: Duration = Duration::from_millis(2);

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Every write call, in order.
    write_log: Vec<Vec<u8>>,
    /// Once the read queue is drained, reads report end of stream.
    end_of_stream: bool,
    /// Once the read queue is drained, reads fail with this kind.
    read_failure: Option<ErrorKind>,
    /// Writes fail with this kind.
    write_failure: Option<ErrorKind>,
    /// Each write sleeps this long before being logged.
    write_delay: Duration,
    /// Writes report success without accepting anything.
    writes_stalled: bool,
    /// The next read times out regardless of queued data.
    should_timeout: bool,
    timeout: Duration,
}

/// Mock serial port implementation for testing.
///
/// # Example
/// ```
/// use serial_link::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"Hi");
///
/// let mut buffer = [0u8; 2];
/// assert_eq!(port.read_bytes(&mut buffer).unwrap(), 2);
/// assert_eq!(&buffer, b"Hi");
///
/// port.write_bytes(b"ok").unwrap();
/// assert_eq!(port.get_write_log(), vec![b"ok".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_secs(1),
                ..Default::default()
            })),
        }
    }

    /// An opener that hands out clones of this port whatever name is asked for.
    pub fn opener(&self) -> DeviceOpener {
        let port = self.clone();
        Arc::new(move |_name: &str, config: PortConfiguration| -> Result<Box<dyn SerialPortAdapter>, PortError> {
            let mut handle = port.clone();
            handle.set_timeout(config.timeout)?;
            Ok(Box::new(handle) as Box<dyn SerialPortAdapter>)
        })
    }

    /// An opener that always fails, as if the device did not exist.
    pub fn failing_opener() -> DeviceOpener {
        Arc::new(
            |name: &str, _config: PortConfiguration| -> Result<Box<dyn SerialPortAdapter>, PortError> {
                Err(PortError::not_found(name))
            },
        )
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Report end of stream once the queued bytes are consumed.
    pub fn close_stream(&self) {
        self.state.lock().end_of_stream = true;
    }

    /// Fail reads with `kind` once the queued bytes are consumed.
    pub fn fail_reads(&self, kind: ErrorKind) {
        self.state.lock().read_failure = Some(kind);
    }

    /// Fail every subsequent write with `kind`.
    pub fn fail_writes(&self, kind: ErrorKind) {
        self.state.lock().write_failure = Some(kind);
    }

    /// Make every write return `Ok(0)`, as a driver whose buffer is full.
    pub fn stall_writes(&self) {
        self.state.lock().writes_stalled = true;
    }

    /// Make every write take `delay`.
    pub fn set_write_delay(&self, delay: Duration) {
        self.state.lock().write_delay = delay;
    }

    /// Make the next read time out even if data is queued.
    pub fn set_should_timeout(&self, should_timeout: bool) {
        self.state.lock().should_timeout = should_timeout;
    }

    /// Get a copy of every write call made to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// All written bytes, concatenated.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.state.lock().write_log.concat()
    }

    /// Number of write calls made so far.
    pub fn write_count(&self) -> usize {
        self.state.lock().write_log.len()
    }

    /// Get the number of bytes still queued for reading.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    /// The timeout most recently set through the adapter.
    pub fn timeout(&self) -> Duration {
        self.state.lock().timeout
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let delay = {
            let state = self.state.lock();
            if let Some(kind) = state.write_failure {
                return Err(PortError::Io(std::io::Error::new(kind, "injected write failure")));
            }
            if state.writes_stalled {
                return Ok(0);
            }
            state.write_delay
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        self.state.lock().write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.timeout));
        }

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }
        if bytes_read > 0 || buffer.is_empty() {
            return Ok(bytes_read);
        }

        if let Some(kind) = state.read_failure {
            return Err(PortError::Io(std::io::Error::new(kind, "injected read failure")));
        }
        if state.end_of_stream {
            return Ok(0);
        }

        // Idle line: block briefly, then time out like a real device.
        let timeout = state.timeout;
        drop(state);
        std::thread::sleep(IDLE_READ_BLOCK.min(timeout));
        Err(PortError::timeout(timeout))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.state.lock().timeout = timeout;
        Ok(())
    }

    fn try_clone_adapter(&self) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        Ok(Box::new(self.clone()))
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello");

        let mut buffer = [0u8; 10];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buffer[..n], b"Hello");
    }

    #[test]
    fn test_write_logging() {
        let mut port = MockSerialPort::new("MOCK0");
        port.write_bytes(b"A").unwrap();
        port.write_bytes(b"B").unwrap();

        assert_eq!(port.get_write_log(), vec![b"A".to_vec(), b"B".to_vec()]);
        assert_eq!(port.written_bytes(), b"AB");
        assert_eq!(port.write_count(), 2);
    }

    #[test]
    fn test_idle_read_times_out() {
        let mut port = MockSerialPort::new("MOCK0");
        let mut buffer = [0u8; 1];

        let err = port.read_bytes(&mut buffer).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_one_shot_timeout() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"x");
        port.set_should_timeout(true);

        let mut buffer = [0u8; 1];
        assert!(matches!(port.read_bytes(&mut buffer), Err(PortError::Timeout(_))));
        assert_eq!(port.read_bytes(&mut buffer).unwrap(), 1);
    }

    #[test]
    fn test_end_of_stream_after_drain() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"z");
        port.close_stream();

        let mut buffer = [0u8; 1];
        assert_eq!(port.read_bytes(&mut buffer).unwrap(), 1);
        assert_eq!(port.read_bytes(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_injected_failures_are_fatal() {
        let mut port = MockSerialPort::new("MOCK0");
        port.fail_reads(ErrorKind::BrokenPipe);
        port.fail_writes(ErrorKind::BrokenPipe);

        let mut buffer = [0u8; 1];
        assert!(!port.read_bytes(&mut buffer).unwrap_err().is_transient());
        assert!(port.write_bytes(b"x").is_err());
        assert_eq!(port.write_count(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let port = MockSerialPort::new("MOCK0");
        let mut clone = port.try_clone_adapter().unwrap();
        clone.write_bytes(b"q").unwrap();
        assert_eq!(port.written_bytes(), b"q");
    }

    #[test]
    fn test_opener_applies_timeout() {
        let port = MockSerialPort::new("MOCK0");
        let opener = port.opener();
        let config = PortConfiguration {
            baud_rate: 115200,
            timeout: Duration::from_millis(50),
        };
        let handle = opener("ignored", config).unwrap();
        assert_eq!(handle.name(), "MOCK0");
        assert_eq!(port.timeout(), Duration::from_millis(50));
    }

    #[test]
    fn test_failing_opener() {
        let opener = MockSerialPort::failing_opener();
        let err = opener("COM9", PortConfiguration::default()).unwrap_err();
        assert!(matches!(err, PortError::NotFound(name) if name == "COM9"));
    }

    #[test]
    fn test_stalled_writes_accept_nothing() {
        let mut port = MockSerialPort::new("MOCK0");
        port.stall_writes();

        assert_eq!(port.write_bytes(b"x").unwrap(), 0);
        assert_eq!(port.write_count(), 0);
    }
}
