//! APFS node dumper
//!
//! Renders one text entry per verified block: a title line, the decoded
//! object header, a section specific to the object type, an optional hex
//! dump of the used bytes, and a separator.

use super::hexdump::{trimmed_len, write_hex_dump};
use super::node_types::{describe_type_flags, node_type_label, ObjectType};
use crate::domain::entities::{
    Block, BlockHeader, TableHeader, BLOCK_SIZE, OBJECT_HEADER_SIZE, TABLE_HEADER_SIZE,
};
use crate::domain::repositories::NodeDumper;
use crate::utils::{format_uuid, le_u16, le_u32, le_u64};
use std::borrow::Cow;
use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 120;

const BTNODE_ROOT: u16 = 0x0001;
const BTNODE_LEAF: u16 = 0x0002;
const BTNODE_FIXED_KV_SIZE: u16 = 0x0004;
const BTNODE_HASHED: u16 = 0x0008;
const BTNODE_NOHEADER: u16 = 0x0010;
const BTNODE_CHECK_KOFF_INVAL: u16 = 0x8000;

/// Size of the tree info trailer stored at the end of a root node
const BTREE_INFO_SIZE: usize = 40;

/// Fixed-size entries default to object map keys and values
const DEFAULT_FIXED_KEY_SIZE: usize = 16;
const DEFAULT_FIXED_VALUE_SIZE: usize = 16;

/// Child pointers in index nodes are object ids
const CHILD_OID_SIZE: usize = 8;

const VALUE_OFFSET_INVALID: u16 = 0xFFFF;

/// Longest key or value rendered in full
const MAX_FIELD_BYTES: usize = 32;

const MAX_FILE_SYSTEMS: usize = 100;

/// Text renderer for verified APFS blocks
#[derive(Debug, Clone, Default)]
pub struct ApfsNodeDumper {
    text: bool,
}

impl ApfsNodeDumper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeDumper for ApfsNodeDumper {
    fn set_text(&mut self, enabled: bool) {
        self.text = enabled;
    }

    fn node_type_label(&self, header: &BlockHeader) -> Cow<'static, str> {
        Cow::Owned(node_type_label(header.obj_type, header.subtype))
    }

    fn dump_node<W: Write + ?Sized>(
        &self,
        out: &mut W,
        block: &Block,
        index: u64,
    ) -> io::Result<()> {
        let header = block.header();
        let data = block.as_bytes();

        writeln!(
            out,
            "[Block {index:016X}] {}",
            node_type_label(header.obj_type, header.subtype)
        )?;
        write_object_header(out, &header)?;

        match ObjectType::from_code(header.obj_type) {
            ObjectType::ContainerSuperblock => write_container_superblock(out, data)?,
            ObjectType::VolumeSuperblock => write_volume_superblock(out, data)?,
            ObjectType::ObjectMap => write_object_map(out, data)?,
            ObjectType::BtreeRoot | ObjectType::BtreeNode => write_btree_node(out, data)?,
            _ => {}
        }

        if self.text {
            writeln!(out, "  payload:")?;
            write_hex_dump(out, &data[..trimmed_len(data)])?;
        }

        write_separator(out)
    }

    fn dump_raw<W: Write + ?Sized>(
        &self,
        out: &mut W,
        block: &Block,
        index: u64,
    ) -> io::Result<()> {
        let data = block.as_bytes();
        writeln!(out, "{index:016X}")?;
        write_hex_dump(out, &data[..trimmed_len(data)])?;
        write_separator(out)
    }
}

fn write_separator<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH))?;
    writeln!(out)
}

fn write_object_header<W: Write + ?Sized>(out: &mut W, header: &BlockHeader) -> io::Result<()> {
    writeln!(out, "  checksum : {:016X}", header.checksum)?;
    writeln!(out, "  oid      : {:016X}", header.oid)?;
    writeln!(out, "  xid      : {:016X}", header.xid)?;
    writeln!(
        out,
        "  type     : {:08X} [{}]",
        header.obj_type,
        describe_type_flags(header.obj_type)
    )?;
    writeln!(out, "  subtype  : {:08X}", header.subtype)
}

#[inline]
fn u16_at(data: &[u8], at: usize) -> u16 {
    le_u16(data, at).unwrap_or(0)
}

#[inline]
fn u32_at(data: &[u8], at: usize) -> u32 {
    le_u32(data, at).unwrap_or(0)
}

#[inline]
fn u64_at(data: &[u8], at: usize) -> u64 {
    le_u64(data, at).unwrap_or(0)
}

fn uuid_at(data: &[u8], at: usize) -> String {
    let mut raw = [0u8; 16];
    if let Some(bytes) = data.get(at..at + 16) {
        raw.copy_from_slice(bytes);
    }
    format_uuid(&raw)
}

fn magic_at(data: &[u8], at: usize) -> String {
    data.get(at..at + 4)
        .map(|m| String::from_utf8_lossy(m).into_owned())
        .unwrap_or_default()
}

fn write_container_superblock<W: Write + ?Sized>(out: &mut W, data: &[u8]) -> io::Result<()> {
    writeln!(out, "  Container:")?;
    writeln!(out, "    magic            : {}", magic_at(data, 32))?;
    writeln!(out, "    block size       : {:#x}", u32_at(data, 36))?;
    writeln!(out, "    block count      : {:#x}", u64_at(data, 40))?;
    writeln!(out, "    features         : {:016X}", u64_at(data, 48))?;
    writeln!(out, "    ro compat        : {:016X}", u64_at(data, 56))?;
    writeln!(out, "    incompat         : {:016X}", u64_at(data, 64))?;
    writeln!(out, "    uuid             : {}", uuid_at(data, 72))?;
    writeln!(out, "    next oid         : {:016X}", u64_at(data, 88))?;
    writeln!(out, "    next xid         : {:016X}", u64_at(data, 96))?;
    writeln!(out, "    spaceman oid     : {:016X}", u64_at(data, 152))?;
    writeln!(out, "    omap oid         : {:016X}", u64_at(data, 160))?;
    writeln!(out, "    reaper oid       : {:016X}", u64_at(data, 168))?;

    let max_fs = (u32_at(data, 180) as usize).min(MAX_FILE_SYSTEMS);
    writeln!(out, "    max file systems : {max_fs}")?;
    for slot in 0..max_fs {
        let oid = u64_at(data, 184 + slot * 8);
        if oid != 0 {
            writeln!(out, "    fs oid [{slot:2}]      : {oid:016X}")?;
        }
    }
    Ok(())
}

fn volume_role_name(role: u16) -> &'static str {
    match role {
        0x0000 => "None",
        0x0001 => "System",
        0x0002 => "User",
        0x0004 => "Recovery",
        0x0008 => "VM",
        0x0010 => "Preboot",
        0x0020 => "Installer",
        0x0040 => "Data",
        0x0080 => "Baseband",
        0x00C0 => "Update",
        0x0100 => "xART",
        0x0140 => "Hardware",
        0x0180 => "Backup",
        _ => "Unknown",
    }
}

fn write_volume_superblock<W: Write + ?Sized>(out: &mut W, data: &[u8]) -> io::Result<()> {
    let name_bytes = data.get(704..960).unwrap_or_default();
    let name_len = name_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(name_bytes.len());
    let role = u16_at(data, 964);

    writeln!(out, "  Volume:")?;
    writeln!(out, "    magic            : {}", magic_at(data, 32))?;
    writeln!(out, "    fs index         : {}", u32_at(data, 36))?;
    writeln!(out, "    name             : {}", String::from_utf8_lossy(&name_bytes[..name_len]))?;
    writeln!(out, "    role             : {:04X} ({})", role, volume_role_name(role))?;
    writeln!(out, "    uuid             : {}", uuid_at(data, 240))?;
    writeln!(out, "    omap oid         : {:016X}", u64_at(data, 128))?;
    writeln!(out, "    root tree oid    : {:016X}", u64_at(data, 136))?;
    writeln!(out, "    extentref oid    : {:016X}", u64_at(data, 144))?;
    writeln!(out, "    snap meta oid    : {:016X}", u64_at(data, 152))?;
    writeln!(out, "    files            : {}", u64_at(data, 184))?;
    writeln!(out, "    directories      : {}", u64_at(data, 192))?;
    writeln!(out, "    symlinks         : {}", u64_at(data, 200))?;
    writeln!(out, "    snapshots        : {}", u64_at(data, 216))
}

fn write_object_map<W: Write + ?Sized>(out: &mut W, data: &[u8]) -> io::Result<()> {
    writeln!(out, "  Object map:")?;
    writeln!(out, "    flags            : {:08X}", u32_at(data, 32))?;
    writeln!(out, "    snapshots        : {}", u32_at(data, 36))?;
    writeln!(out, "    tree type        : {:08X}", u32_at(data, 40))?;
    writeln!(out, "    snap tree type   : {:08X}", u32_at(data, 44))?;
    writeln!(out, "    tree oid         : {:016X}", u64_at(data, 48))?;
    writeln!(out, "    snap tree oid    : {:016X}", u64_at(data, 56))?;
    writeln!(out, "    latest snap xid  : {:016X}", u64_at(data, 64))
}

fn describe_node_flags(flags: u16) -> String {
    let names = [
        (BTNODE_ROOT, "Root"),
        (BTNODE_LEAF, "Leaf"),
        (BTNODE_FIXED_KV_SIZE, "Fixed"),
        (BTNODE_HASHED, "Hashed"),
        (BTNODE_NOHEADER, "NoHeader"),
        (BTNODE_CHECK_KOFF_INVAL, "CheckKoffInval"),
    ];
    let set: Vec<&str> = names
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    set.join(", ")
}

fn format_field(bytes: Option<&[u8]>) -> String {
    match bytes {
        None => "<out of bounds>".to_string(),
        Some(b) if b.len() > MAX_FIELD_BYTES => {
            format!("{}.. ({} bytes)", hex::encode_upper(&b[..MAX_FIELD_BYTES]), b.len())
        }
        Some(b) => hex::encode_upper(b),
    }
}

/// One table-of-contents entry: key offset/length, value offset/length
struct TocEntry {
    key_offset: usize,
    key_length: usize,
    value_offset: u16,
    value_length: usize,
}

fn write_btree_node<W: Write + ?Sized>(out: &mut W, data: &[u8]) -> io::Result<()> {
    let table = TableHeader::decode(data).unwrap_or_default();
    let is_root = table.flags & BTNODE_ROOT != 0;
    let is_fixed = table.flags & BTNODE_FIXED_KV_SIZE != 0;

    writeln!(out, "  Node:")?;
    writeln!(
        out,
        "    flags            : {:04X} [{}]",
        table.flags,
        describe_node_flags(table.flags)
    )?;
    writeln!(out, "    level            : {}", table.level)?;
    writeln!(out, "    entries          : {}", table.entry_count)?;
    writeln!(
        out,
        "    table space      : {:04X} +{:04X}",
        table.toc_offset, table.toc_length
    )?;
    writeln!(
        out,
        "    free space       : {:04X} +{:04X}",
        table.free_offset, table.free_length
    )?;

    let value_end = if is_root {
        BLOCK_SIZE - BTREE_INFO_SIZE
    } else {
        BLOCK_SIZE
    };

    let mut key_size = DEFAULT_FIXED_KEY_SIZE;
    let mut value_size = DEFAULT_FIXED_VALUE_SIZE;

    if is_root {
        let info = value_end;
        let info_key_size = u32_at(data, info + 8) as usize;
        let info_value_size = u32_at(data, info + 12) as usize;
        writeln!(out, "  Tree info:")?;
        writeln!(out, "    flags            : {:08X}", u32_at(data, info))?;
        writeln!(out, "    node size        : {:#x}", u32_at(data, info + 4))?;
        writeln!(out, "    key size         : {info_key_size:#x}")?;
        writeln!(out, "    value size       : {info_value_size:#x}")?;
        writeln!(out, "    longest key      : {:#x}", u32_at(data, info + 16))?;
        writeln!(out, "    longest value    : {:#x}", u32_at(data, info + 20))?;
        writeln!(out, "    key count        : {}", u64_at(data, info + 24))?;
        writeln!(out, "    node count       : {}", u64_at(data, info + 32))?;
        if is_fixed && info_key_size != 0 {
            key_size = info_key_size;
            value_size = info_value_size;
        }
    }
    if table.level > 0 {
        value_size = CHILD_OID_SIZE;
    }

    let toc_start = OBJECT_HEADER_SIZE + TABLE_HEADER_SIZE + table.toc_offset as usize;
    let toc_end = toc_start + table.toc_length as usize;
    let key_start = toc_end;
    let entry_size = if is_fixed { 4 } else { 8 };

    writeln!(out, "  Entries:")?;
    for i in 0..table.entry_count as usize {
        let at = toc_start + i * entry_size;
        if at + entry_size > toc_end || at + entry_size > data.len() {
            writeln!(out, "    (table of contents ends after {i} entries)")?;
            break;
        }

        let entry = if is_fixed {
            TocEntry {
                key_offset: u16_at(data, at) as usize,
                key_length: key_size,
                value_offset: u16_at(data, at + 2),
                value_length: value_size,
            }
        } else {
            TocEntry {
                key_offset: u16_at(data, at) as usize,
                key_length: u16_at(data, at + 2) as usize,
                value_offset: u16_at(data, at + 4),
                value_length: u16_at(data, at + 6) as usize,
            }
        };

        let key_at = key_start + entry.key_offset;
        let key = data.get(key_at..key_at + entry.key_length);

        let value = if entry.value_offset == VALUE_OFFSET_INVALID {
            None
        } else {
            value_end
                .checked_sub(entry.value_offset as usize)
                .and_then(|start| data.get(start..start + entry.value_length))
        };

        match value {
            Some(v) if table.level > 0 => writeln!(
                out,
                "    {i:4}: {} -> child {:016X}",
                format_field(key),
                u64_at(v, 0)
            )?,
            Some(v) => writeln!(out, "    {i:4}: {} -> {}", format_field(key), format_field(Some(v)))?,
            None => writeln!(out, "    {i:4}: {} -> <no value>", format_field(key))?,
        }
    }
    Ok(())
}
