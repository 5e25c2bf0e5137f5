//! GUID Partition Table reader
//!
//! Parses the primary GPT header at LBA 1 and its partition entry array,
//! checking both CRC32 values, then looks for the first APFS partition.

use crate::domain::repositories::{BlockDevice, DeviceError, PartitionMap};
use crate::utils::{le_u32, le_u64};
use thiserror::Error;
use tracing::debug;

/// "EFI PART"
const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";

/// Sector sizes probed for the header, in order
const SECTOR_SIZES: [u64; 2] = [512, 4096];

const MIN_HEADER_SIZE: u32 = 92;
const MIN_ENTRY_SIZE: u32 = 128;

/// Upper bound on the partition array read into memory
const MAX_ENTRY_ARRAY: usize = 1024 * 1024;

/// APFS partition type GUID 7C3457EF-0000-11AA-AA11-00306543ECAC, on-disk byte order
pub const APFS_PARTITION_TYPE: [u8; 16] = [
    0xEF, 0x57, 0x34, 0x7C, 0x00, 0x00, 0xAA, 0x11, 0xAA, 0x11, 0x00, 0x30, 0x65, 0x43, 0xEC,
    0xAC,
];

/// Why a partition table was rejected
#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("no GPT signature")]
    NoSignature,

    #[error("GPT header CRC mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    HeaderCrc { stored: u32, computed: u32 },

    #[error("partition array CRC mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    EntriesCrc { stored: u32, computed: u32 },

    #[error("malformed GPT header: {0}")]
    Malformed(String),

    #[error("read failed: {0}")]
    Read(#[from] DeviceError),
}

/// One decoded partition entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GptEntry {
    pub type_guid: [u8; 16],
    pub unique_guid: [u8; 16],
    pub first_lba: u64,
    pub last_lba: u64,
    pub attributes: u64,
    pub name: String,
}

impl GptEntry {
    fn decode(raw: &[u8]) -> Option<Self> {
        let mut type_guid = [0u8; 16];
        type_guid.copy_from_slice(raw.get(0..16)?);
        let mut unique_guid = [0u8; 16];
        unique_guid.copy_from_slice(raw.get(16..32)?);

        let name_units: Vec<u16> = raw
            .get(56..128)?
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .take_while(|&u| u != 0)
            .collect();

        Some(Self {
            type_guid,
            unique_guid,
            first_lba: le_u64(raw, 32)?,
            last_lba: le_u64(raw, 40)?,
            attributes: le_u64(raw, 48)?,
            name: String::from_utf16_lossy(&name_units),
        })
    }

    #[inline]
    pub fn is_unused(&self) -> bool {
        self.type_guid == [0u8; 16]
    }

    #[inline]
    pub fn is_apfs(&self) -> bool {
        self.type_guid == APFS_PARTITION_TYPE
    }
}

/// GPT-backed [`PartitionMap`]
#[derive(Debug, Default)]
pub struct GptPartitionMap {
    sector_size: u64,
    entries: Vec<GptEntry>,
}

impl GptPartitionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sector size the header was found at, 0 before a successful load
    pub fn sector_size(&self) -> u64 {
        self.sector_size
    }

    /// Used entries of the loaded table
    pub fn entries(&self) -> &[GptEntry] {
        &self.entries
    }

    /// Loads the table, reporting why it was rejected
    pub fn load<D: BlockDevice + ?Sized>(&mut self, device: &mut D) -> Result<(), PartitionError> {
        self.entries.clear();
        self.sector_size = 0;

        let mut last_error = PartitionError::NoSignature;
        for sector_size in SECTOR_SIZES {
            match Self::load_at(device, sector_size) {
                Ok(entries) => {
                    self.sector_size = sector_size;
                    self.entries = entries;
                    return Ok(());
                }
                Err(e) => {
                    debug!(sector_size, error = %e, "no GPT at this sector size");
                    // a damaged header says more than a missing one
                    if !matches!(e, PartitionError::NoSignature) {
                        last_error = e;
                    }
                }
            }
        }
        Err(last_error)
    }

    fn load_at<D: BlockDevice + ?Sized>(
        device: &mut D,
        sector_size: u64,
    ) -> Result<Vec<GptEntry>, PartitionError> {
        if device.size() < sector_size * 2 {
            return Err(PartitionError::NoSignature);
        }

        let mut header = vec![0u8; sector_size as usize];
        device.read_at(sector_size, &mut header)?;

        if &header[0..8] != GPT_SIGNATURE {
            return Err(PartitionError::NoSignature);
        }

        let header_size = le_u32(&header, 12).unwrap_or(0);
        if header_size < MIN_HEADER_SIZE || header_size as u64 > sector_size {
            return Err(PartitionError::Malformed(format!(
                "header size {header_size}"
            )));
        }

        let stored = le_u32(&header, 16).unwrap_or(0);
        let mut covered = header[..header_size as usize].to_vec();
        covered[16..20].fill(0);
        let computed = crc32fast::hash(&covered);
        if stored != computed {
            return Err(PartitionError::HeaderCrc { stored, computed });
        }

        let malformed = || PartitionError::Malformed("truncated header".into());
        let entries_lba = le_u64(&header, 72).ok_or_else(malformed)?;
        let entry_count = le_u32(&header, 80).ok_or_else(malformed)?;
        let entry_size = le_u32(&header, 84).ok_or_else(malformed)?;
        let entries_crc = le_u32(&header, 88).ok_or_else(malformed)?;

        if entry_size < MIN_ENTRY_SIZE || entry_size % 8 != 0 {
            return Err(PartitionError::Malformed(format!(
                "entry size {entry_size}"
            )));
        }

        let array_len = entry_count as usize * entry_size as usize;
        if array_len > MAX_ENTRY_ARRAY {
            return Err(PartitionError::Malformed(format!(
                "partition array of {array_len} bytes"
            )));
        }

        let array_offset = entries_lba
            .checked_mul(sector_size)
            .ok_or_else(|| PartitionError::Malformed("entry LBA overflow".into()))?;
        let mut array = vec![0u8; array_len];
        device.read_at(array_offset, &mut array)?;

        let computed = crc32fast::hash(&array);
        if entries_crc != computed {
            return Err(PartitionError::EntriesCrc {
                stored: entries_crc,
                computed,
            });
        }

        Ok(array
            .chunks_exact(entry_size as usize)
            .filter_map(GptEntry::decode)
            .filter(|e| !e.is_unused())
            .collect())
    }
}

impl PartitionMap for GptPartitionMap {
    fn load_and_verify<D: BlockDevice + ?Sized>(&mut self, device: &mut D) -> bool {
        match self.load(device) {
            Ok(()) => {
                debug!(
                    sector_size = self.sector_size,
                    partitions = self.entries.len(),
                    "loaded GPT"
                );
                true
            }
            Err(e) => {
                debug!(error = %e, "partition table rejected");
                false
            }
        }
    }

    fn find_first_filesystem_partition(&self) -> Option<usize> {
        self.entries.iter().position(GptEntry::is_apfs)
    }

    fn partition_offset_and_size(&self, index: usize) -> Option<(u64, u64)> {
        let entry = self.entries.get(index)?;
        if entry.last_lba < entry.first_lba {
            return None;
        }
        let offset = entry.first_lba.checked_mul(self.sector_size)?;
        let size = (entry.last_lba - entry.first_lba + 1).checked_mul(self.sector_size)?;
        Some((offset, size))
    }
}
