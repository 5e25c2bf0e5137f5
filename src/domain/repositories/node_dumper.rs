//! Node dumper trait
//!
//! Renders verified blocks as text. The scan passes decide which blocks
//! reach the dumper; the dumper owns the layout of each entry.

use crate::domain::entities::{Block, BlockHeader};
use std::borrow::Cow;
use std::io::{self, Write};

/// Trait for rendering decoded nodes
pub trait NodeDumper {
    /// Enables or disables payload text rendering
    fn set_text(&mut self, enabled: bool);

    /// Human-readable label for a node's type and subtype
    fn node_type_label(&self, header: &BlockHeader) -> Cow<'static, str>;

    /// Writes one decoded-node entry for a verified block
    fn dump_node<W: Write + ?Sized>(&self, out: &mut W, block: &Block, index: u64)
        -> io::Result<()>;

    /// Writes one raw entry for a block that failed verification
    fn dump_raw<W: Write + ?Sized>(&self, out: &mut W, block: &Block, index: u64)
        -> io::Result<()>;
}
