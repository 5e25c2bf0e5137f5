//! APFS collaborators: checksum verification and node rendering

pub mod checksum;
mod dumper;
pub mod hexdump;
pub mod node_types;
mod verifier;

pub use dumper::ApfsNodeDumper;
pub use verifier::ApfsBlockVerifier;
