//! Summary map use case
//!
//! Writes one fixed-width hex row per non-empty block and a single boundary
//! row at the start of every run of empty blocks.

use crate::application::dto::ScanStats;
use crate::application::error::ScanError;
use crate::domain::entities::{Block, Classification, PartitionBounds, ScanCursor};
use crate::domain::repositories::{BlockDevice, BlockVerifier, NodeDumper};
use crate::domain::services::{classify, CancellationToken};
use std::io::Write;
use tracing::{info, warn};

pub const MAP_HEADER: &str =
    "[Block]  | Node ID  | Version  | Type     | Subtype  | Flgs | Levl | Entries  | Description";

pub const MAP_SEPARATOR: &str = "---------+----------+----------+----------+----------+------+------+----------+---------------------------------";

/// Boundary row written once per run of empty blocks
pub const EMPTY_ROW: &str =
    "---------+----------+----------+----------+----------+------+------+----------+ Empty";

const DATA_COLUMNS: &str = " |          |          |          |          |      |      |          | Data";

const ROOT_MARKER: &str = " [Root]";

/// Summary map use case
///
/// Borrows the verifier that classifies blocks and the dumper that
/// supplies node type labels.
pub struct MapBlocksUseCase<'a, V: ?Sized, N> {
    verifier: &'a V,
    labeler: &'a N,
}

impl<'a, V, N> MapBlocksUseCase<'a, V, N>
where
    V: BlockVerifier + ?Sized,
    N: NodeDumper,
{
    pub fn new(verifier: &'a V, labeler: &'a N) -> Self {
        Self { verifier, labeler }
    }

    /// Writes the summary map for `bounds` to `out`
    ///
    /// Cancellation is checked before each block is read. A run of empty
    /// blocks cut short by cancellation gets no extra boundary row.
    pub fn execute<D, W>(
        &self,
        device: &mut D,
        bounds: PartitionBounds,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<ScanStats, ScanError>
    where
        D: BlockDevice + ?Sized,
        W: Write + ?Sized,
    {
        info!(%bounds, "writing summary map");

        writeln!(out, "{MAP_HEADER}")?;
        writeln!(out, "{MAP_SEPARATOR}")?;

        let mut block = Block::new();
        let mut stats = ScanStats::default();
        // scan start counts as a transition into an empty run
        let mut last_was_used = true;
        let mut cursor = ScanCursor::new(bounds, cancel);

        for index in cursor.by_ref() {
            device
                .read_block(index, &mut block)
                .map_err(|source| ScanError::Read { index, source })?;

            let classification = classify(self.verifier, block.as_bytes());
            stats.record(classification);

            match classification {
                Classification::Empty => {
                    if last_was_used {
                        writeln!(out, "{EMPTY_ROW}")?;
                        stats.entries_written += 1;
                    }
                    last_was_used = false;
                }
                Classification::ValidStructured => {
                    self.write_node_row(out, &block, index)?;
                    stats.entries_written += 1;
                    last_was_used = true;
                }
                Classification::InvalidRaw => {
                    writeln!(out, "{index:08X}{DATA_COLUMNS}")?;
                    stats.entries_written += 1;
                    last_was_used = true;
                }
            }
        }

        stats.cancelled = cursor.was_cancelled();
        writeln!(out)?;
        out.flush()?;

        if stats.cancelled {
            warn!(at = cursor.position(), "summary map cancelled");
        }
        info!(%stats, "summary map done");

        Ok(stats)
    }

    fn write_node_row<W: Write + ?Sized>(
        &self,
        out: &mut W,
        block: &Block,
        index: u64,
    ) -> Result<(), ScanError> {
        let header = block.header();
        let table = block.table_header();
        let label = self.labeler.node_type_label(&header);
        let root = if header.is_root() { ROOT_MARKER } else { "" };

        writeln!(
            out,
            "{:08X} | {:08X} | {:08X} | {:08X} | {:08X} | {:04X} | {:04X} | {:08X} | {}{}",
            index,
            header.oid,
            header.xid,
            header.obj_type,
            header.subtype,
            table.flags,
            table.level,
            table.entry_count,
            label,
            root
        )?;
        Ok(())
    }
}
