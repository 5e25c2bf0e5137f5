//! Scan statistics DTO

use crate::domain::entities::Classification;
use std::fmt;

/// Per-pass counters returned by both report passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Blocks read and classified
    pub blocks_visited: u64,
    /// Blocks classified as empty
    pub empty_blocks: u64,
    /// Blocks that verified as structured nodes
    pub valid_blocks: u64,
    /// Non-empty blocks that failed verification
    pub invalid_blocks: u64,
    /// Entries written to the report (rows or node entries)
    pub entries_written: u64,
    /// Whether the pass stopped early on cancellation
    pub cancelled: bool,
}

impl ScanStats {
    /// Counts one classified block
    pub fn record(&mut self, classification: Classification) {
        self.blocks_visited += 1;
        match classification {
            Classification::Empty => self.empty_blocks += 1,
            Classification::ValidStructured => self.valid_blocks += 1,
            Classification::InvalidRaw => self.invalid_blocks += 1,
        }
    }
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} blocks ({} nodes, {} data, {} empty), {} entries",
            self.blocks_visited,
            self.valid_blocks,
            self.invalid_blocks,
            self.empty_blocks,
            self.entries_written
        )?;
        if self.cancelled {
            write!(f, ", cancelled")?;
        }
        Ok(())
    }
}
