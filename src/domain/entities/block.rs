//! Block entity
//!
//! A fixed-size block read from the device, plus the header views decoded
//! from it for display. Views are decoded field by field from fixed byte
//! offsets; nothing is overlaid on the raw buffer.

use crate::utils::{le_u16, le_u32, le_u64};
use std::fmt;

/// Size of every block read from the device
pub const BLOCK_SIZE: usize = 4096;

/// Size of the object header at the start of every structured block
pub const OBJECT_HEADER_SIZE: usize = 32;

/// Size of the B-tree node header that follows the object header
pub const TABLE_HEADER_SIZE: usize = 24;

/// Mask applied to the type code before comparing it with [`ROOT_NODE_TYPE`]
pub const ROOT_TYPE_MASK: u32 = 0x0FFF_FFFF;

/// Masked type code of a B-tree root node
pub const ROOT_NODE_TYPE: u32 = 0x0000_0002;

/// A single device block
///
/// The buffer is allocated once per scan pass and refilled on every
/// iteration; it carries no state from one block to the next.
#[derive(Clone)]
pub struct Block {
    data: Box<[u8; BLOCK_SIZE]>,
}

impl Block {
    /// Creates a zero-filled block
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; BLOCK_SIZE]),
        }
    }

    /// Creates a block from raw bytes, zero-padding or truncating to [`BLOCK_SIZE`]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut block = Self::new();
        let len = bytes.len().min(BLOCK_SIZE);
        block.data[..len].copy_from_slice(&bytes[..len]);
        block
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    #[inline]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// Decodes the object header
    pub fn header(&self) -> BlockHeader {
        // a full block always covers the header
        BlockHeader::decode(self.as_bytes()).unwrap_or_default()
    }

    /// Decodes the B-tree table header
    ///
    /// Only meaningful when the block verified as a structured node.
    pub fn table_header(&self) -> TableHeader {
        TableHeader::decode(self.as_bytes()).unwrap_or_default()
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block").field("header", &self.header()).finish()
    }
}

/// Object header present at offset 0 of every structured block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHeader {
    /// Fletcher-64 checksum of the rest of the block
    pub checksum: u64,
    /// Node (object) identifier
    pub oid: u64,
    /// Transaction identifier
    pub xid: u64,
    /// Type code, including storage flags in the high bits
    pub obj_type: u32,
    /// Subtype code
    pub subtype: u32,
}

impl BlockHeader {
    /// Decodes the header from the first [`OBJECT_HEADER_SIZE`] bytes of `buf`
    pub fn decode(buf: &[u8]) -> Option<Self> {
        Some(Self {
            checksum: le_u64(buf, 0)?,
            oid: le_u64(buf, 8)?,
            xid: le_u64(buf, 16)?,
            obj_type: le_u32(buf, 24)?,
            subtype: le_u32(buf, 28)?,
        })
    }

    /// Returns true when the masked type code designates a B-tree root
    #[inline]
    pub fn is_root(&self) -> bool {
        self.obj_type & ROOT_TYPE_MASK == ROOT_NODE_TYPE
    }
}

/// B-tree node header that follows the object header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableHeader {
    /// Node flags (root / leaf / fixed-size entries)
    pub flags: u16,
    /// Level in the tree, 0 for leaves
    pub level: u16,
    /// Number of entries stored in the node
    pub entry_count: u32,
    /// Offset of the table of contents, relative to the end of this header
    pub toc_offset: u16,
    /// Length of the table of contents
    pub toc_length: u16,
    /// Offset of the free space, relative to the end of the table of contents
    pub free_offset: u16,
    /// Length of the free space
    pub free_length: u16,
}

impl TableHeader {
    /// Decodes the table header located right after the object header
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let base = OBJECT_HEADER_SIZE;
        Some(Self {
            flags: le_u16(buf, base)?,
            level: le_u16(buf, base + 2)?,
            entry_count: le_u32(buf, base + 4)?,
            toc_offset: le_u16(buf, base + 8)?,
            toc_length: le_u16(buf, base + 10)?,
            free_offset: le_u16(buf, base + 12)?,
            free_length: le_u16(buf, base + 14)?,
        })
    }
}

/// Three-way outcome assigned to every block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// No meaningful content
    Empty,
    /// Header and checksum are self-consistent
    ValidStructured,
    /// Non-empty content that failed verification
    InvalidRaw,
}

impl Classification {
    pub fn name(&self) -> &'static str {
        match self {
            Classification::Empty => "Empty",
            Classification::ValidStructured => "Node",
            Classification::InvalidRaw => "Data",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
