//! The transmit worker: one queued byte, one write call.
//!
//! Writes are never batched, which keeps ordering and backpressure trivial at
//! the cost of throughput.

use super::LinkShared;
use crate::error::LinkFault;
use crate::port::SerialPortAdapter;
use crate::queue::Dequeued;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

pub(crate) struct TransmitTask {
    pub device: String,
    pub port: Box<dyn SerialPortAdapter>,
    pub poll: Duration,
    pub shared: Arc<LinkShared>,
}

impl TransmitTask {
    pub fn run(mut self) {
        debug!(device = %self.device, "transmit worker started");
        let flags = &self.shared.flags;

        loop {
            let byte = match self.shared.outbound.pop_or_wait(self.poll, || flags.is_closed()) {
                Dequeued::Byte(byte) => byte,
                Dequeued::Stopped => break,
            };
            // Stop may have raced the dequeue; the handle is already closed.
            if flags.is_closed() {
                trace!(byte, "dropping byte queued after close");
                break;
            }
            match self.port.write_bytes(&[byte]) {
                Ok(0) => {
                    warn!(device = %self.device, byte, "device accepted no bytes");
                    self.shared
                        .record_fault(LinkFault::Write("device accepted no bytes".into()));
                    break;
                }
                Ok(_) => trace!(byte, "tx"),
                Err(e) => {
                    warn!(device = %self.device, error = %e, "serial write failed");
                    self.shared.record_fault(LinkFault::write(&e));
                    break;
                }
            }
        }

        if flags.mark_closed() {
            debug!(device = %self.device, "transmit worker closed the link");
        }
        info!(
            device = %self.device,
            unsent = self.shared.outbound.len(),
            "transmit worker stopped"
        );
    }
}
