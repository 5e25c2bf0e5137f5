//! Block device implementations

mod file_block_device;
mod memory_block_device;
mod mmap_block_device;

pub use file_block_device::FileBlockDevice;
pub use memory_block_device::MemoryBlockDevice;
pub use mmap_block_device::MmapBlockDevice;

use crate::domain::repositories::{BlockDevice, DeviceError};
use std::path::Path;

/// Device reader chosen at open time
pub enum DeviceReader {
    Mmap(MmapBlockDevice),
    File(FileBlockDevice),
}

impl DeviceReader {
    /// Opens `path`, preferring a memory mapping and falling back to file reads
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        match MmapBlockDevice::open(path) {
            Ok(device) => Ok(DeviceReader::Mmap(device)),
            Err(_) => Ok(DeviceReader::File(FileBlockDevice::open(path)?)),
        }
    }

    #[inline]
    pub fn is_mmap(&self) -> bool {
        matches!(self, DeviceReader::Mmap(_))
    }
}

impl BlockDevice for DeviceReader {
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<(), DeviceError> {
        match self {
            DeviceReader::Mmap(d) => d.read_at(offset, buffer),
            DeviceReader::File(d) => d.read_at(offset, buffer),
        }
    }

    fn size(&self) -> u64 {
        match self {
            DeviceReader::Mmap(d) => d.size(),
            DeviceReader::File(d) => d.size(),
        }
    }
}
