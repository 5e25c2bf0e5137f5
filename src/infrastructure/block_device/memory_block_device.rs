//! In-memory block device
//!
//! Backs synthetic images for tests and for callers that already hold the
//! image bytes.

use crate::domain::entities::BLOCK_SIZE;
use crate::domain::repositories::{BlockDevice, DeviceError};

/// Block device over an owned byte vector
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockDevice {
    data: Vec<u8>,
}

impl MemoryBlockDevice {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Creates a zero-filled device of `size` bytes
    pub fn zeroed(size: usize) -> Self {
        Self::new(vec![0u8; size])
    }

    /// Copies `bytes` to byte offset `offset`, growing the device if needed
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) {
        let end = offset + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
    }

    /// Copies `bytes` to the start of block `index`
    pub fn write_block(&mut self, index: u64, bytes: &[u8]) {
        self.write_at(index as usize * BLOCK_SIZE, bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<(), DeviceError> {
        let size = self.data.len() as u64;
        if offset >= size && !buffer.is_empty() {
            return Err(DeviceError::InvalidOffset {
                offset,
                device_size: size,
            });
        }

        let start = offset as usize;
        let available = self.data.len() - start;
        if available < buffer.len() {
            return Err(DeviceError::ShortRead {
                offset,
                expected: buffer.len(),
                actual: available,
            });
        }

        buffer.copy_from_slice(&self.data[start..start + buffer.len()]);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
