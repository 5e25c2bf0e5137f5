//! Partition bounds resolution
//!
//! Finds the filesystem partition once, before any report pass runs.

use crate::domain::entities::PartitionBounds;
use crate::domain::repositories::{BlockDevice, PartitionMap};
use tracing::{debug, info};

/// Resolves the block range to scan
///
/// Uses the first filesystem partition of a verified partition table.
/// Falls back to block 0 through `device_size / BLOCK_SIZE` when there is
/// no table, no filesystem partition, or the partition is smaller than a
/// block.
pub fn resolve_bounds<D, P>(device: &mut D, partitions: &mut P) -> PartitionBounds
where
    D: BlockDevice + ?Sized,
    P: PartitionMap,
{
    let device_size = device.size();

    let located = if partitions.load_and_verify(device) {
        match partitions.find_first_filesystem_partition() {
            Some(index) => {
                debug!(index, "found filesystem partition");
                partitions.partition_offset_and_size(index)
            }
            None => {
                debug!("partition table has no filesystem partition");
                None
            }
        }
    } else {
        debug!("no valid partition table");
        None
    };

    match located.and_then(|(offset, size)| PartitionBounds::from_byte_range(offset, size)) {
        Some(bounds) => {
            info!(%bounds, "scanning partition");
            bounds
        }
        None => {
            let bounds = PartitionBounds::whole_device(device_size);
            info!(%bounds, "scanning whole device");
            bounds
        }
    }
}
