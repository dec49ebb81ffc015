//! Whether the core node is synced enough to accept submissions.
//!
//! The relay only reads this flag. Something else (the node binary's sync
//! poller, or a test) keeps it current; a slightly stale answer is fine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A snapshot of upstream readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Readiness {
    pub synced: bool,
}

/// Source of [`Readiness`] snapshots.
pub trait ReadinessProvider: Send + Sync {
    fn readiness(&self) -> Readiness;
}

/// Shared, lock-free sync flag. Starts out not synced.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    synced: Arc<AtomicBool>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that starts out synced. Handy for tests and for deployments
    /// that front a node they already trust.
    pub fn synced() -> Self {
        let state = Self::new();
        state.set_synced(true);
        state
    }

    pub fn set_synced(&self, synced: bool) {
        self.synced.store(synced, Ordering::Release);
    }

    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }
}

impl ReadinessProvider for SyncState {
    fn readiness(&self) -> Readiness {
        Readiness {
            synced: self.is_synced(),
        }
    }
}
