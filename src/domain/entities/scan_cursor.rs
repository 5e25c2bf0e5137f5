//! Scan cursor entity
//!
//! Walks a [`PartitionBounds`] range one block at a time, polling the
//! cancellation token before yielding each index.

use super::partition::PartitionBounds;
use crate::domain::services::CancellationToken;

/// Monotonic block iterator shared by both report passes
///
/// Yields absolute block indices. Cancellation is observed at most once per
/// block, before the block is handed out, so a block that has been yielded
/// is always processed to completion by the caller.
#[derive(Debug)]
pub struct ScanCursor<'a> {
    next: u64,
    end: u64,
    cancel: &'a CancellationToken,
    cancelled: bool,
}

impl<'a> ScanCursor<'a> {
    pub fn new(bounds: PartitionBounds, cancel: &'a CancellationToken) -> Self {
        Self {
            next: bounds.start(),
            end: bounds.end(),
            cancel,
            cancelled: false,
        }
    }

    /// Absolute index of the next block to be yielded
    #[inline]
    pub fn position(&self) -> u64 {
        self.next
    }

    /// Returns true if iteration stopped because of cancellation
    #[inline]
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Iterator for ScanCursor<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.end || self.cancelled {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.cancelled = true;
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(index)
    }
}
