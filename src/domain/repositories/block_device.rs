//! Block device reader trait
//!
//! Defines the interface for reading raw blocks from a device or image.
//! This abstraction keeps the scan passes independent of the storage medium.

use crate::domain::entities::{Block, BLOCK_SIZE};
use std::io;
use thiserror::Error;

/// Errors that can occur when opening or reading a block device
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid offset: {offset} exceeds device size {device_size}")]
    InvalidOffset { offset: u64, device_size: u64 },

    #[error("Short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Device error: {0}")]
    Other(String),
}

/// Trait for reading raw data from block devices
///
/// Implementations can target disk image files, memory-mapped images,
/// physical devices, or in-memory buffers.
///
/// # Example
///
/// ```ignore
/// let mut device = DeviceReader::open("disk.img")?;
/// let mut block = Block::new();
/// device.read_block(0, &mut block)?;
/// ```
pub trait BlockDevice {
    /// Fills `buffer` with the bytes starting at byte `offset`
    ///
    /// Either the whole buffer is filled or an error is returned; a read
    /// that runs past the end of the device is a [`DeviceError::ShortRead`]
    /// or [`DeviceError::InvalidOffset`].
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<(), DeviceError>;

    /// Returns the total size in bytes
    fn size(&self) -> u64;

    /// Reads the block at absolute index `index`
    fn read_block(&mut self, index: u64, block: &mut Block) -> Result<(), DeviceError> {
        let offset = index
            .checked_mul(BLOCK_SIZE as u64)
            .ok_or(DeviceError::InvalidOffset {
                offset: u64::MAX,
                device_size: self.size(),
            })?;
        self.read_at(offset, block.as_mut_bytes())
    }
}
