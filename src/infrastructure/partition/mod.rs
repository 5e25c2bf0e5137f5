//! Partition table implementations

mod gpt;

pub use gpt::{GptEntry, GptPartitionMap, PartitionError, APFS_PARTITION_TYPE};
