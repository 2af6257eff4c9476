//! Background workers and the state they share with the controller.
//!
//! One receive worker and at most one transmit worker run per controller.
//! They coordinate only through the outbound queue and the lifecycle flags;
//! failures are reduced to `closed` plus a [`LinkFault`] record.

pub(crate) mod receive;
pub(crate) mod transmit;

use crate::error::LinkFault;
use crate::lifecycle::LifecycleFlags;
use crate::queue::OutboundQueue;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::warn;

/// State shared by the controller and its workers.
#[derive(Debug, Default)]
pub(crate) struct LinkShared {
    pub flags: LifecycleFlags,
    pub outbound: OutboundQueue,
    fault: Mutex<Option<LinkFault>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    /// Set when the controller is dropped. Only consulted around the open.
    abandoned: AtomicBool,
}

impl LinkShared {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the first fault; later ones are consequences of it.
    pub fn record_fault(&self, fault: LinkFault) {
        let mut slot = self.fault.lock();
        if slot.is_none() {
            *slot = Some(fault);
        }
    }

    pub fn fault(&self) -> Option<LinkFault> {
        self.fault.lock().clone()
    }

    /// Paired with `LifecycleFlags::mark_initialized` (both `SeqCst`): either
    /// the receive worker sees this, or the dropping owner sees `initialized`.
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::SeqCst);
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    pub fn track(&self, handle: JoinHandle<()>) {
        self.workers.lock().push(handle);
    }

    /// Join every worker, including ones spawned while joining.
    pub fn join_all(&self) {
        loop {
            // Release the lock before joining; the receive worker may still
            // need it to register the transmit worker.
            let next = self.workers.lock().pop();
            let Some(handle) = next else { break };
            let name = handle.thread().name().map(str::to_owned);
            if handle.join().is_err() {
                warn!(worker = ?name, "serial worker panicked");
            }
        }
    }
}

/// Thread names are built from the device path, which may contain slashes.
pub(crate) fn thread_name(role: &str, device: &str) -> String {
    let device = device.trim_start_matches("/dev/").replace(['/', '\\'], "_");
    format!("serial-{role}-{device}")
}
