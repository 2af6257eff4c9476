//! The controller: owns one connection attempt to one device.
//!
//! A controller is launched once and discarded after [`Controller::stop`].
//! Reconnecting, or changing any setting, means building a new one; every
//! controller has its own queues, flags and device handle.
//!
//! ```no_run
//! use serial_link::{ConnectionConfig, Controller, FramingMode};
//!
//! let link = Controller::new(ConnectionConfig::new("/dev/ttyUSB0", 9600).with_mode(FramingMode::Text));
//! link.launch()?;
//! link.send_line("PING");
//! while let Some(line) = link.try_recv_line() {
//!     println!("{line}");
//! }
//! link.stop();
//! # Ok::<(), serial_link::LinkError>(())
//! ```

use crate::config::LinkConfig;
use crate::error::{LinkError, LinkFault};
use crate::framing::{encode_line, BinaryFramer, Framer, FramingMode, LineFramer};
use crate::port::{DeviceOpener, PortConfiguration, SyncSerialPort};
use crate::queue::InboundQueue;
use crate::worker::receive::ReceiveTask;
use crate::worker::{thread_name, LinkShared};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Default device read timeout. Also the worst-case time for the receive
/// worker to notice a stop.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Default bound on an idle transmit worker's wait between `closed` checks.
pub const DEFAULT_WRITER_POLL: Duration = Duration::from_secs(1);

/// Settings for one connection attempt. Fixed for the lifetime of a
/// controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub device: String,
    pub baud_rate: u32,
    pub mode: FramingMode,
    /// Pause before opening, for devices that need to settle.
    pub startup_delay: Option<Duration>,
    pub read_timeout: Duration,
    pub writer_poll: Duration,
}

impl ConnectionConfig {
    pub fn new(device: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            device: device.into(),
            baud_rate,
            mode: FramingMode::default(),
            startup_delay: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            writer_poll: DEFAULT_WRITER_POLL,
        }
    }

    pub fn with_mode(mut self, mode: FramingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = Some(delay);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_writer_poll(mut self, poll: Duration) -> Self {
        self.writer_poll = poll;
        self
    }

    fn port_configuration(&self) -> PortConfiguration {
        PortConfiguration {
            baud_rate: self.baud_rate,
            timeout: self.read_timeout,
        }
    }
}

/// Non-blocking front end to a serial device.
///
/// All methods return immediately. Received data is polled with
/// [`try_recv_byte`](Self::try_recv_byte) or
/// [`try_recv_line`](Self::try_recv_line) depending on the framing mode, and
/// link failure is detected by polling [`is_closed`](Self::is_closed).
pub struct Controller {
    config: ConnectionConfig,
    opener: DeviceOpener,
    shared: Arc<LinkShared>,
    bytes_in: Arc<InboundQueue<u8>>,
    lines_in: Arc<InboundQueue<String>>,
    launched: AtomicBool,
}

impl Controller {
    /// A controller for a hardware device.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_opener(config, SyncSerialPort::opener())
    }

    /// A controller for the hardware device a `[link]` section describes.
    /// Fails if the section would not open a usable link.
    pub fn from_config(link: &LinkConfig) -> Result<Self, LinkError> {
        Ok(Self::new(link.connection()?))
    }

    /// A controller that obtains its device handle from `opener`.
    pub fn with_opener(config: ConnectionConfig, opener: DeviceOpener) -> Self {
        Self {
            config,
            opener,
            shared: Arc::new(LinkShared::new()),
            bytes_in: Arc::new(InboundQueue::new()),
            lines_in: Arc::new(InboundQueue::new()),
            launched: AtomicBool::new(false),
        }
    }

    /// Start the receive worker, which waits out the startup delay, opens the
    /// device and starts the transmit worker.
    ///
    /// Returns before the device is opened. `is_initialized` turns true once
    /// the open attempt finishes; check `is_closed` to see whether it worked.
    ///
    /// # Errors
    ///
    /// - `LinkError::AlreadyLaunched` if called a second time
    /// - `LinkError::Spawn` if the worker thread could not be created; the link
    ///   is then closed
    pub fn launch(&self) -> Result<(), LinkError> {
        if self.launched.swap(true, Ordering::AcqRel) {
            return Err(LinkError::AlreadyLaunched(self.config.device.clone()));
        }

        let framer: Box<dyn Framer> = match self.config.mode {
            FramingMode::Binary => Box::new(BinaryFramer::new(Arc::clone(&self.bytes_in))),
            FramingMode::Text => Box::new(LineFramer::new(Arc::clone(&self.lines_in))),
        };
        let task = ReceiveTask {
            device: self.config.device.clone(),
            port: self.config.port_configuration(),
            startup_delay: self.config.startup_delay,
            writer_poll: self.config.writer_poll,
            opener: Arc::clone(&self.opener),
            framer,
            shared: Arc::clone(&self.shared),
        };

        let handle = std::thread::Builder::new()
            .name(thread_name("rx", &self.config.device))
            .spawn(move || task.run())
            .map_err(|e| {
                self.shared.record_fault(LinkFault::OpenFailure(e.to_string()));
                self.shared.flags.mark_closed();
                self.shared.flags.mark_initialized();
                LinkError::Spawn(e)
            })?;
        self.shared.track(handle);

        debug!(device = %self.config.device, mode = ?self.config.mode, "serial link launched");
        Ok(())
    }

    /// Close the link without waiting for the workers.
    ///
    /// Only acts once the open attempt has finished and the link is still
    /// open: a stop before launch or during the startup delay is ignored. The
    /// device handle is released once both workers notice, which takes at most
    /// the read timeout; use [`join`](Self::join) to wait for that.
    pub fn stop(&self) {
        if !self.shared.flags.is_initialized() || self.shared.flags.is_closed() {
            return;
        }
        if self.shared.flags.mark_closed() {
            debug!(device = %self.config.device, "serial link stopped");
        }
        self.shared.outbound.wake();
    }

    /// Block until both workers have exited.
    pub fn join(&self) {
        self.shared.join_all();
    }

    /// Queue one byte for transmission.
    pub fn send_byte(&self, byte: u8) {
        self.enqueue(&[byte]);
    }

    /// Queue raw bytes for transmission, contiguous relative to other senders.
    pub fn send_bytes(&self, data: &[u8]) {
        self.enqueue(data);
    }

    /// Queue a line: one byte per char (non-ASCII sent as `?`) followed by
    /// `\n`.
    pub fn send_line(&self, text: &str) {
        self.enqueue(&encode_line(text));
    }

    fn enqueue(&self, data: &[u8]) {
        if self.shared.flags.is_closed() {
            trace!(len = data.len(), "link closed, bytes will not be sent");
        }
        self.shared.outbound.extend(data);
    }

    /// Take the oldest received byte, if any. Binary mode only.
    pub fn try_recv_byte(&self) -> Option<u8> {
        self.bytes_in.try_pop()
    }

    /// Take the oldest received line, if any. Text mode only.
    pub fn try_recv_line(&self) -> Option<String> {
        self.lines_in.try_pop()
    }

    pub fn received_byte_count(&self) -> usize {
        self.bytes_in.len()
    }

    pub fn received_line_count(&self) -> usize {
        self.lines_in.len()
    }

    /// Bytes queued but not yet handed to the device.
    pub fn pending_send_count(&self) -> usize {
        self.shared.outbound.len()
    }

    /// True once the open attempt has completed, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.shared.flags.is_initialized()
    }

    /// True once the link has ended, for any reason. Never reverts.
    pub fn is_closed(&self) -> bool {
        self.shared.flags.is_closed()
    }

    /// What ended the link, if a worker observed a failure.
    pub fn last_fault(&self) -> Option<LinkFault> {
        self.shared.fault()
    }

    pub fn device(&self) -> &str {
        &self.config.device
    }

    pub fn mode(&self) -> FramingMode {
        self.config.mode
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // Abandon first: a worker still in its startup delay must not open.
        self.shared.abandon();
        self.stop();
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("device", &self.config.device)
            .field("mode", &self.config.mode)
            .field("initialized", &self.is_initialized())
            .field("closed", &self.is_closed())
            .finish()
    }
}
