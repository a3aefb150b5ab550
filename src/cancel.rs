//! Cooperative cancellation shared across all solver layers.
//!
//! The search loop creates one token per request and hands clones down
//! through the sequential packer, the per-container runner and the packing
//! algorithms. Triggering it stops in-flight work at the next poll point;
//! cancellation is a normal termination path, never an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared cancellation flag.
///
/// Clones observe the same underlying signal. Polling is cheap enough for
/// per-item checks inside the packer.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers cancellation for every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
