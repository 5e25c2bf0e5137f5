//! Application layer
//!
//! Use cases that drive the report passes over a resolved block range.

pub mod dto;
mod error;
mod map_blocks;
mod resolve_bounds;
mod scan_blocks;

pub use error::ScanError;
pub use map_blocks::{MapBlocksUseCase, EMPTY_ROW, MAP_HEADER, MAP_SEPARATOR};
pub use resolve_bounds::resolve_bounds;
pub use scan_blocks::ScanBlocksUseCase;
