//! Block verifier trait

/// Decides whether a block is empty or structurally valid
///
/// Both checks must be pure functions of the block bytes.
pub trait BlockVerifier {
    /// True when the block carries no meaningful content
    fn is_empty_block(&self, block: &[u8]) -> bool;

    /// True when the block's checksum and header are self-consistent
    fn verify_block(&self, block: &[u8]) -> bool;
}
