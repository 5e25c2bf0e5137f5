//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: device readers,
//! the GPT partition map and the APFS verifier and dumper.

pub mod apfs;
pub mod block_device;
pub mod partition;
