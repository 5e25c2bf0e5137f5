//! Partition map trait
//!
//! Locates the filesystem partition inside a larger device.

use super::block_device::BlockDevice;

/// Trait for partition table readers
///
/// A missing or malformed table is an ordinary outcome, not an error:
/// [`load_and_verify`](Self::load_and_verify) simply reports `false` and the
/// scanner falls back to the whole device.
pub trait PartitionMap {
    /// Reads and validates the partition table
    fn load_and_verify<D: BlockDevice + ?Sized>(&mut self, device: &mut D) -> bool;

    /// Index of the first partition holding the scanned filesystem
    fn find_first_filesystem_partition(&self) -> Option<usize>;

    /// Byte offset and byte size of the partition at `index`
    fn partition_offset_and_size(&self, index: usize) -> Option<(u64, u64)>;
}
