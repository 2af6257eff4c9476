//! The receive worker: opens the device, starts the transmitter, then reads
//! one byte at a time into the framer until the link closes.

use super::{thread_name, transmit, LinkShared};
use crate::error::LinkFault;
use crate::framing::Framer;
use crate::port::{DeviceOpener, PortConfiguration, SerialPortAdapter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

pub(crate) struct ReceiveTask {
    pub device: String,
    pub port: PortConfiguration,
    pub startup_delay: Option<Duration>,
    pub writer_poll: Duration,
    pub opener: DeviceOpener,
    pub framer: Box<dyn Framer>,
    pub shared: Arc<LinkShared>,
}

impl ReceiveTask {
    pub fn run(mut self) {
        if let Some(delay) = self.startup_delay.filter(|d| !d.is_zero()) {
            debug!(device = %self.device, ?delay, "waiting for device to settle");
            std::thread::sleep(delay);
        }

        // Nobody is left to stop a link opened for a dropped controller.
        if self.shared.is_abandoned() {
            debug!(device = %self.device, "controller dropped before the device was opened");
            return;
        }

        let Some(mut port) = self.open() else {
            self.shared.flags.mark_initialized();
            return;
        };
        self.shared.flags.mark_initialized();
        info!(device = %self.device, baud = self.port.baud_rate, "serial link open");
        if self.shared.is_abandoned() {
            self.shared.flags.mark_closed();
        }

        self.read_loop(port.as_mut());

        if self.shared.flags.mark_closed() {
            debug!(device = %self.device, "receive worker closed the link");
        }
        // Let an idle transmitter see `closed` without waiting out its poll.
        self.shared.outbound.wake();
        info!(device = %self.device, "receive worker stopped");
    }

    /// Open the device and start the transmit worker. On failure the link is
    /// closed and `None` returned.
    fn open(&self) -> Option<Box<dyn SerialPortAdapter>> {
        let port = match (self.opener)(&self.device, self.port) {
            Ok(port) => port,
            Err(e) => return self.fail_open(LinkFault::open(&e)),
        };
        let writer = match port.try_clone_adapter() {
            Ok(writer) => writer,
            Err(e) => return self.fail_open(LinkFault::open(&e)),
        };

        let task = transmit::TransmitTask {
            device: self.device.clone(),
            port: writer,
            poll: self.writer_poll,
            shared: Arc::clone(&self.shared),
        };
        match std::thread::Builder::new()
            .name(thread_name("tx", &self.device))
            .spawn(move || task.run())
        {
            Ok(handle) => self.shared.track(handle),
            Err(e) => return self.fail_open(LinkFault::OpenFailure(e.to_string())),
        }

        Some(port)
    }

    fn fail_open<T>(&self, fault: LinkFault) -> Option<T> {
        warn!(device = %self.device, %fault, "serial link failed to start");
        self.shared.record_fault(fault);
        self.shared.flags.mark_closed();
        None
    }

    fn read_loop(&mut self, port: &mut dyn SerialPortAdapter) {
        let mut byte = [0u8; 1];
        while !self.shared.flags.is_closed() {
            match port.read_bytes(&mut byte) {
                Ok(0) => {
                    debug!(device = %self.device, "end of stream");
                    self.shared.record_fault(LinkFault::EndOfStream);
                    break;
                }
                Ok(_) => {
                    trace!(byte = byte[0], "rx");
                    self.framer.push(byte[0]);
                }
                Err(e) if e.is_transient() => continue,
                Err(e) => {
                    // A read interrupted by our own stop is not a fault.
                    if !self.shared.flags.is_closed() {
                        warn!(device = %self.device, error = %e, "serial read failed");
                        self.shared.record_fault(LinkFault::read(&e));
                    }
                    break;
                }
            }
        }
    }
}
