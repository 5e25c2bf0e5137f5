//! File-backed block device
//!
//! Reads image files and physical devices (`/dev/sdX`, `/dev/diskN`) with
//! plain positioned reads. Works for devices that cannot be memory-mapped.

use crate::domain::repositories::{BlockDevice, DeviceError};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Read-only block device over a file handle
///
/// # Example
///
/// ```ignore
/// let mut device = FileBlockDevice::open("/dev/sdb")?;
/// let mut block = Block::new();
/// device.read_block(0, &mut block)?;
/// ```
pub struct FileBlockDevice {
    file: File,
    size: u64,
}

impl FileBlockDevice {
    /// Opens the device read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(false)
            .open(path)
            .map_err(|e| open_error(path, e))?;

        // opening a directory read-only succeeds on unix, reading it does not
        if file.metadata()?.is_dir() {
            return Err(DeviceError::Other(format!(
                "{} is a directory",
                path.display()
            )));
        }

        #[cfg(target_os = "linux")]
        {
            use rustix::fs::{fadvise, Advice};

            let _ = fadvise(&file, 0, None, Advice::Sequential);
        }

        // block devices report a zero metadata length, seeking works for both
        let size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        Ok(Self { file, size })
    }
}

impl BlockDevice for FileBlockDevice {
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<(), DeviceError> {
        if offset >= self.size && !buffer.is_empty() {
            return Err(DeviceError::InvalidOffset {
                offset,
                device_size: self.size,
            });
        }

        self.file.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buffer.len() {
            match self.file.read(&mut buffer[filled..]) {
                Ok(0) => {
                    return Err(DeviceError::ShortRead {
                        offset,
                        expected: buffer.len(),
                        actual: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    #[inline]
    fn size(&self) -> u64 {
        self.size
    }
}

pub(super) fn open_error(path: &Path, e: io::Error) -> DeviceError {
    match e.kind() {
        io::ErrorKind::NotFound => DeviceError::DeviceNotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => DeviceError::PermissionDenied(format!(
            "{} - try running with sudo",
            path.display()
        )),
        _ => DeviceError::IoError(e),
    }
}
