//! Synthetic APFS images shared by the integration tests

#![allow(dead_code)]

use apfs_dump::domain::entities::BLOCK_SIZE;
use apfs_dump::infrastructure::apfs::checksum::seal_object;
use apfs_dump::infrastructure::block_device::MemoryBlockDevice;
use apfs_dump::infrastructure::partition::APFS_PARTITION_TYPE;
use std::path::{Path, PathBuf};

pub const OBJ_PHYSICAL: u32 = 0x4000_0000;
pub const OBJECT_TYPE_NX_SUPERBLOCK: u32 = 0x01;
pub const OBJECT_TYPE_BTREE: u32 = 0x02;
pub const OBJECT_TYPE_BTREE_NODE: u32 = 0x03;
pub const OBJECT_TYPE_OMAP: u32 = 0x0B;
pub const OBJECT_TYPE_FSTREE: u32 = 0x0E;

/// A checksummed object with the given header fields
pub fn object(oid: u64, xid: u64, obj_type: u32, subtype: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; BLOCK_SIZE];
    bytes[8..16].copy_from_slice(&oid.to_le_bytes());
    bytes[16..24].copy_from_slice(&xid.to_le_bytes());
    bytes[24..28].copy_from_slice(&obj_type.to_le_bytes());
    bytes[28..32].copy_from_slice(&subtype.to_le_bytes());
    seal_object(&mut bytes);
    bytes
}

/// A checksummed B-tree node with an empty table of contents
pub fn btree_node(oid: u64, xid: u64, root: bool, level: u16, entries: u32) -> Vec<u8> {
    let obj_type = OBJ_PHYSICAL
        | if root {
            OBJECT_TYPE_BTREE
        } else {
            OBJECT_TYPE_BTREE_NODE
        };
    let mut bytes = object(oid, xid, obj_type, OBJECT_TYPE_FSTREE);
    let flags: u16 = (if root { 0x0001 } else { 0 }) | (if level == 0 { 0x0002 } else { 0 });
    bytes[32..34].copy_from_slice(&flags.to_le_bytes());
    bytes[34..36].copy_from_slice(&level.to_le_bytes());
    bytes[36..40].copy_from_slice(&entries.to_le_bytes());
    seal_object(&mut bytes);
    bytes
}

/// Non-zero content whose checksum does not verify
pub fn garbage(seed: u8) -> Vec<u8> {
    (0..BLOCK_SIZE)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed) | 1)
        .collect()
}

/// A zeroed image of `blocks` blocks with `placed` written at their indices
pub fn image(blocks: u64, placed: &[(u64, Vec<u8>)]) -> MemoryBlockDevice {
    let mut device = MemoryBlockDevice::zeroed(blocks as usize * BLOCK_SIZE);
    for (index, bytes) in placed {
        device.write_block(*index, bytes);
    }
    device
}

/// The 16 MiB image: block 5 a verified node, block 9 unverified data
pub fn worked_example() -> MemoryBlockDevice {
    image(
        4096,
        &[
            (5, btree_node(0x404, 0x1F, true, 0, 3)),
            (9, garbage(7)),
        ],
    )
}

/// Writes a GPT with one APFS partition spanning `first_lba..=last_lba`
/// (512-byte sectors) into `device`
pub fn add_gpt(device: &mut MemoryBlockDevice, first_lba: u64, last_lba: u64) {
    let mut array = vec![0u8; 128 * 128];
    array[0..16].copy_from_slice(&APFS_PARTITION_TYPE);
    array[16] = 1;
    array[32..40].copy_from_slice(&first_lba.to_le_bytes());
    array[40..48].copy_from_slice(&last_lba.to_le_bytes());
    device.write_at(1024, &array);

    let mut header = vec![0u8; 92];
    header[0..8].copy_from_slice(b"EFI PART");
    header[8..12].copy_from_slice(&0x0001_0000u32.to_le_bytes());
    header[12..16].copy_from_slice(&92u32.to_le_bytes());
    header[24..32].copy_from_slice(&1u64.to_le_bytes());
    header[72..80].copy_from_slice(&2u64.to_le_bytes());
    header[80..84].copy_from_slice(&128u32.to_le_bytes());
    header[84..88].copy_from_slice(&128u32.to_le_bytes());
    header[88..92].copy_from_slice(&crc32fast::hash(&array).to_le_bytes());
    let crc = crc32fast::hash(&header);
    header[16..20].copy_from_slice(&crc.to_le_bytes());
    device.write_at(512, &header);
}

/// Saves `device` as an image file under `dir`
pub fn save(dir: &Path, name: &str, device: &MemoryBlockDevice) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, device.as_bytes()).unwrap();
    path
}

pub fn empty_rows(map: &str) -> usize {
    map.lines().filter(|l| l.ends_with("+ Empty")).count()
}

pub fn data_rows(map: &str) -> Vec<&str> {
    map.lines().filter(|l| l.ends_with("| Data")).collect()
}

/// Rows for verified blocks: a hex index followed by decoded fields
pub fn node_rows(map: &str) -> Vec<&str> {
    map.lines()
        .skip(2)
        .filter(|l| !l.ends_with("+ Empty") && !l.ends_with("| Data") && !l.is_empty())
        .collect()
}

pub fn dump_entries(dump: &str) -> usize {
    dump.lines().filter(|l| l.starts_with("[Block ")).count()
}
