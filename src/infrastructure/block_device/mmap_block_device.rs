//! Memory-mapped block device implementation
//!
//! Zero-copy access to image files. Block devices usually cannot be mapped,
//! see [`DeviceReader::open`](super::DeviceReader::open) for the fallback.

use super::file_block_device::open_error;
use crate::domain::repositories::{BlockDevice, DeviceError};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Memory-mapped block device reader
pub struct MmapBlockDevice {
    mmap: Mmap,
    size: u64,
}

impl MmapBlockDevice {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let size = file.metadata()?.len();

        if size == 0 {
            return Err(DeviceError::Other(format!(
                "{} has zero size, cannot be mapped",
                path.display()
            )));
        }

        // SAFETY: the mapping is read-only and the image is not expected to
        // change while it is being scanned
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| DeviceError::Other(format!("Failed to memory-map file: {}", e)))?;

        #[cfg(target_os = "linux")]
        {
            let _ = mmap.advise(memmap2::Advice::Sequential);
        }

        Ok(Self { mmap, size })
    }

    /// Returns a slice at the specified offset and length
    #[inline]
    pub fn slice_at(&self, offset: u64, length: usize) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(length)?;
        self.mmap.get(start..end)
    }
}

impl BlockDevice for MmapBlockDevice {
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<(), DeviceError> {
        if let Some(slice) = self.slice_at(offset, buffer.len()) {
            buffer.copy_from_slice(slice);
            return Ok(());
        }

        if offset >= self.size {
            return Err(DeviceError::InvalidOffset {
                offset,
                device_size: self.size,
            });
        }

        Err(DeviceError::ShortRead {
            offset,
            expected: buffer.len(),
            actual: (self.size - offset) as usize,
        })
    }

    #[inline]
    fn size(&self) -> u64 {
        self.size
    }
}
