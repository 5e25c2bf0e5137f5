//! Repository traits (interfaces)
//!
//! These traits define the contracts for the collaborators the scanner
//! consumes: raw device reads, partition lookup, block verification and
//! node rendering.

mod block_device;
mod block_verifier;
mod node_dumper;
mod partition_map;

pub use block_device::{BlockDevice, DeviceError};
pub use block_verifier::BlockVerifier;
pub use node_dumper::NodeDumper;
pub use partition_map::PartitionMap;
