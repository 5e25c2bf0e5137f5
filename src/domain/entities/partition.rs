//! Partition bounds entity
//!
//! The contiguous block range assigned to the filesystem being scanned.

use super::block::BLOCK_SIZE;
use std::fmt;

/// Absolute block range scanned by both report passes
///
/// Resolved once before scanning and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionBounds {
    start: u64,
    count: u64,
}

impl PartitionBounds {
    pub fn new(start: u64, count: u64) -> Self {
        Self { start, count }
    }

    /// Range covering every whole block of a device of `device_size` bytes
    pub fn whole_device(device_size: u64) -> Self {
        Self::new(0, device_size / BLOCK_SIZE as u64)
    }

    /// Converts a partition's byte offset and size into block units
    ///
    /// Returns `None` when the partition does not cover a single whole block.
    pub fn from_byte_range(offset: u64, size: u64) -> Option<Self> {
        let count = size / BLOCK_SIZE as u64;
        if count == 0 {
            return None;
        }
        Some(Self::new(offset / BLOCK_SIZE as u64, count))
    }

    /// First absolute block index
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of blocks in the range
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// One past the last absolute block index
    #[inline]
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.count)
    }
}

impl fmt::Display for PartitionBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocks {:#x}..{:#x} ({} blocks)",
            self.start,
            self.end(),
            self.count
        )
    }
}
