//! Domain entities
//!
//! Blocks, their decoded header views, and the block ranges a scan walks.

mod block;
mod partition;
mod scan_cursor;

pub use block::{
    Block, BlockHeader, Classification, TableHeader, BLOCK_SIZE, OBJECT_HEADER_SIZE,
    ROOT_NODE_TYPE, ROOT_TYPE_MASK, TABLE_HEADER_SIZE,
};
pub use partition::PartitionBounds;
pub use scan_cursor::ScanCursor;
