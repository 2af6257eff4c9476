//! The two monotonic flags every worker watches.

use std::sync::atomic::{AtomicBool, Ordering};

/// `initialized` and `closed`, each flipping from false to true once.
#[derive(Debug, Default)]
pub struct LifecycleFlags {
    initialized: AtomicBool,
    closed: AtomicBool,
}

impl LifecycleFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the open attempt has finished, whether or not it succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    /// Set `closed`. Returns true only for the call that performed the
    /// transition.
    pub fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }
}
