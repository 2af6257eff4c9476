//! Lock-guarded FIFO queues shared between the owner and the workers.
//!
//! Each queue has its own lock and no operation takes two of them, so there is
//! no lock ordering to get wrong.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Duration;

/// Unbounded queue filled by the receive worker and polled by the owner.
#[derive(Debug)]
pub struct InboundQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> InboundQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, item: T) {
        self.items.lock().push_back(item);
    }

    /// Pop the oldest item without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for InboundQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`OutboundQueue::pop_or_wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dequeued {
    Byte(u8),
    /// The stop predicate became true while the queue was empty.
    Stopped,
}

/// Bytes waiting for the transmit worker, with a wake-up signal.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    bytes: Mutex<VecDeque<u8>>,
    ready: Condvar,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, byte: u8) {
        self.bytes.lock().push_back(byte);
        self.ready.notify_one();
    }

    /// Append a run of bytes under a single lock, so they stay contiguous
    /// relative to other producers.
    pub fn extend(&self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.bytes.lock().extend(data);
        self.ready.notify_one();
    }

    /// Wake the consumer so it re-checks its stop condition.
    ///
    /// The stop condition lives outside the lock, so the lock is taken first:
    /// a consumer between its empty check and its wait cannot miss this.
    pub fn wake(&self) {
        drop(self.bytes.lock());
        self.ready.notify_all();
    }

    /// Take the oldest byte, waiting while the queue is empty.
    ///
    /// Waits are bounded by `poll` so `stopped` is re-checked even with no
    /// traffic. The lock is released before this returns.
    pub fn pop_or_wait(&self, poll: Duration, stopped: impl Fn() -> bool) -> Dequeued {
        let mut bytes = self.bytes.lock();
        loop {
            if let Some(byte) = bytes.pop_front() {
                return Dequeued::Byte(byte);
            }
            self.ready.wait_for(&mut bytes, poll);
            if stopped() {
                return Dequeued::Stopped;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }
}
