//! Cooperative cancellation
//!
//! A one-way flag set from an asynchronous event (typically Ctrl+C) and
//! polled by the scan loops once per block.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, monotonic abort flag
///
/// Clones observe the same flag. Once [`cancel`](Self::cancel) has been
/// called the token stays cancelled for the rest of the process.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Safe to call any number of times from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
