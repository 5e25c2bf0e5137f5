//! Block classification rule
//!
//! Emptiness is checked first and takes precedence over validity; the
//! verifier is only consulted for non-empty blocks.

use crate::domain::entities::Classification;
use crate::domain::repositories::BlockVerifier;

/// Classifies one block. Pure function of the block bytes.
pub fn classify<V: BlockVerifier + ?Sized>(verifier: &V, block: &[u8]) -> Classification {
    if verifier.is_empty_block(block) {
        Classification::Empty
    } else if verifier.verify_block(block) {
        Classification::ValidStructured
    } else {
        Classification::InvalidRaw
    }
}
