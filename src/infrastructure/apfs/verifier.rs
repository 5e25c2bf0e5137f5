//! APFS block verifier

use super::checksum::verify_object;
use crate::domain::repositories::BlockVerifier;

/// Classifies blocks by APFS rules
///
/// A block is empty when every byte is zero, and valid when its object
/// checksum matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApfsBlockVerifier;

impl ApfsBlockVerifier {
    pub fn new() -> Self {
        Self
    }
}

impl BlockVerifier for ApfsBlockVerifier {
    fn is_empty_block(&self, block: &[u8]) -> bool {
        block.iter().all(|&b| b == 0)
    }

    fn verify_block(&self, block: &[u8]) -> bool {
        verify_object(block)
    }
}
