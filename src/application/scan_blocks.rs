//! Full structural dump use case
//!
//! Walks the block range and hands every verified block to the node dumper.
//! Empty blocks produce nothing. Blocks that fail verification produce
//! nothing either unless the raw dump is switched on in [`DumpOptions`].

use crate::application::dto::{DumpOptions, ScanStats};
use crate::application::error::ScanError;
use crate::domain::entities::{Block, Classification, PartitionBounds, ScanCursor};
use crate::domain::repositories::{BlockDevice, BlockVerifier, NodeDumper};
use crate::domain::services::{classify, CancellationToken};
use std::io::Write;
use tracing::{debug, info, warn};

/// Full structural dump use case
pub struct ScanBlocksUseCase<'a, V: ?Sized, N> {
    verifier: &'a V,
    dumper: N,
    options: DumpOptions,
}

impl<'a, V, N> ScanBlocksUseCase<'a, V, N>
where
    V: BlockVerifier + ?Sized,
    N: NodeDumper,
{
    /// Creates the use case, applying the text setting to the dumper
    pub fn new(verifier: &'a V, mut dumper: N, options: DumpOptions) -> Self {
        dumper.set_text(options.text);
        Self {
            verifier,
            dumper,
            options,
        }
    }

    /// Writes the structural dump for `bounds` to `out`
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
        info!(%bounds, raw_invalid = self.options.raw_invalid, "writing structural dump");

        let mut block = Block::new();
        let mut stats = ScanStats::default();
        let mut cursor = ScanCursor::new(bounds, cancel);

        for index in cursor.by_ref() {
            device
                .read_block(index, &mut block)
                .map_err(|source| ScanError::Read { index, source })?;

            let classification = classify(self.verifier, block.as_bytes());
            stats.record(classification);

            match classification {
                Classification::Empty => {}
                Classification::ValidStructured => {
                    self.dumper.dump_node(out, &block, index)?;
                    stats.entries_written += 1;
                }
                Classification::InvalidRaw if self.options.raw_invalid => {
                    self.dumper.dump_raw(out, &block, index)?;
                    stats.entries_written += 1;
                }
                Classification::InvalidRaw => {
                    debug!(index, %classification, "skipping unverified block");
                }
            }
        }

        stats.cancelled = cursor.was_cancelled();
        out.flush()?;

        if stats.cancelled {
            warn!(at = cursor.position(), "structural dump cancelled");
        }
        info!(%stats, "structural dump done");

        Ok(stats)
    }
}
