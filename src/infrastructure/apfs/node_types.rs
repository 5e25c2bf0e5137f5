//! APFS object types
//!
//! Type codes live in the low 16 bits of the header's type field; the high
//! bits carry the storage class and object flags.

use std::fmt;

pub const OBJECT_TYPE_MASK: u32 = 0x0000_FFFF;
pub const OBJECT_STORAGE_MASK: u32 = 0xC000_0000;

pub const OBJ_VIRTUAL: u32 = 0x0000_0000;
pub const OBJ_EPHEMERAL: u32 = 0x8000_0000;
pub const OBJ_PHYSICAL: u32 = 0x4000_0000;
pub const OBJ_NOHEADER: u32 = 0x2000_0000;
pub const OBJ_ENCRYPTED: u32 = 0x1000_0000;
pub const OBJ_NONPERSISTENT: u32 = 0x0800_0000;

/// Object type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Invalid,
    ContainerSuperblock,
    BtreeRoot,
    BtreeNode,
    SpaceManager,
    SpaceManagerCab,
    SpaceManagerCib,
    SpaceManagerBitmap,
    SpaceManagerFreeQueue,
    ExtentListTree,
    ObjectMap,
    CheckpointMap,
    VolumeSuperblock,
    FileSystemTree,
    BlockRefTree,
    SnapshotMetaTree,
    Reaper,
    ReapList,
    ObjectMapSnapshot,
    EfiJumpstart,
    FusionMiddleTree,
    FusionWbc,
    FusionWbcList,
    EncryptionRollingState,
    GeneralBitmap,
    GeneralBitmapTree,
    GeneralBitmapBlock,
    EncryptionRecoveryBlock,
    SnapshotMetaExt,
    IntegrityMeta,
    FileExtentTree,
    Unknown(u32),
}

impl ObjectType {
    /// Decodes a type code; storage and flag bits are ignored
    pub fn from_code(code: u32) -> Self {
        match code & OBJECT_TYPE_MASK {
            0x00 => ObjectType::Invalid,
            0x01 => ObjectType::ContainerSuperblock,
            0x02 => ObjectType::BtreeRoot,
            0x03 => ObjectType::BtreeNode,
            0x05 => ObjectType::SpaceManager,
            0x06 => ObjectType::SpaceManagerCab,
            0x07 => ObjectType::SpaceManagerCib,
            0x08 => ObjectType::SpaceManagerBitmap,
            0x09 => ObjectType::SpaceManagerFreeQueue,
            0x0A => ObjectType::ExtentListTree,
            0x0B => ObjectType::ObjectMap,
            0x0C => ObjectType::CheckpointMap,
            0x0D => ObjectType::VolumeSuperblock,
            0x0E => ObjectType::FileSystemTree,
            0x0F => ObjectType::BlockRefTree,
            0x10 => ObjectType::SnapshotMetaTree,
            0x11 => ObjectType::Reaper,
            0x12 => ObjectType::ReapList,
            0x13 => ObjectType::ObjectMapSnapshot,
            0x14 => ObjectType::EfiJumpstart,
            0x15 => ObjectType::FusionMiddleTree,
            0x16 => ObjectType::FusionWbc,
            0x17 => ObjectType::FusionWbcList,
            0x18 => ObjectType::EncryptionRollingState,
            0x19 => ObjectType::GeneralBitmap,
            0x1A => ObjectType::GeneralBitmapTree,
            0x1B => ObjectType::GeneralBitmapBlock,
            0x1C => ObjectType::EncryptionRecoveryBlock,
            0x1D => ObjectType::SnapshotMetaExt,
            0x1E => ObjectType::IntegrityMeta,
            0x1F => ObjectType::FileExtentTree,
            other => ObjectType::Unknown(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::Invalid => "Invalid",
            ObjectType::ContainerSuperblock => "Container Superblock",
            ObjectType::BtreeRoot => "B-Tree Root",
            ObjectType::BtreeNode => "B-Tree Node",
            ObjectType::SpaceManager => "Space Manager",
            ObjectType::SpaceManagerCab => "Space Manager CAB",
            ObjectType::SpaceManagerCib => "Space Manager CIB",
            ObjectType::SpaceManagerBitmap => "Space Manager Bitmap",
            ObjectType::SpaceManagerFreeQueue => "Space Manager Free Queue",
            ObjectType::ExtentListTree => "Extent List Tree",
            ObjectType::ObjectMap => "Object Map",
            ObjectType::CheckpointMap => "Checkpoint Map",
            ObjectType::VolumeSuperblock => "Volume Superblock",
            ObjectType::FileSystemTree => "File System Tree",
            ObjectType::BlockRefTree => "Block Reference Tree",
            ObjectType::SnapshotMetaTree => "Snapshot Metadata Tree",
            ObjectType::Reaper => "Reaper",
            ObjectType::ReapList => "Reap List",
            ObjectType::ObjectMapSnapshot => "Object Map Snapshot",
            ObjectType::EfiJumpstart => "EFI Jumpstart",
            ObjectType::FusionMiddleTree => "Fusion Middle Tree",
            ObjectType::FusionWbc => "Fusion Write-Back Cache",
            ObjectType::FusionWbcList => "Fusion Write-Back Cache List",
            ObjectType::EncryptionRollingState => "Encryption Rolling State",
            ObjectType::GeneralBitmap => "General Bitmap",
            ObjectType::GeneralBitmapTree => "General Bitmap Tree",
            ObjectType::GeneralBitmapBlock => "General Bitmap Block",
            ObjectType::EncryptionRecoveryBlock => "Encryption Rolling Recovery Block",
            ObjectType::SnapshotMetaExt => "Snapshot Metadata Extension",
            ObjectType::IntegrityMeta => "Integrity Metadata",
            ObjectType::FileExtentTree => "File Extent Tree",
            ObjectType::Unknown(_) => "Unknown",
        }
    }

    /// Whether blocks of this type carry a B-tree node header
    #[inline]
    pub fn is_btree(&self) -> bool {
        matches!(self, ObjectType::BtreeRoot | ObjectType::BtreeNode)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Unknown(code) => write!(f, "Unknown ({code:#x})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Storage class encoded in the two top bits of the type field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Virtual,
    Ephemeral,
    Physical,
    Invalid,
}

impl StorageClass {
    pub fn from_type(obj_type: u32) -> Self {
        match obj_type & OBJECT_STORAGE_MASK {
            OBJ_VIRTUAL => StorageClass::Virtual,
            OBJ_EPHEMERAL => StorageClass::Ephemeral,
            OBJ_PHYSICAL => StorageClass::Physical,
            _ => StorageClass::Invalid,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageClass::Virtual => "Virtual",
            StorageClass::Ephemeral => "Ephemeral",
            StorageClass::Physical => "Physical",
            StorageClass::Invalid => "Invalid",
        }
    }
}

/// Storage class plus any object flags, e.g. `Physical, Encrypted`
pub fn describe_type_flags(obj_type: u32) -> String {
    let mut parts = vec![StorageClass::from_type(obj_type).name()];
    if obj_type & OBJ_NOHEADER != 0 {
        parts.push("NoHeader");
    }
    if obj_type & OBJ_ENCRYPTED != 0 {
        parts.push("Encrypted");
    }
    if obj_type & OBJ_NONPERSISTENT != 0 {
        parts.push("NonPersistent");
    }
    parts.join(", ")
}

/// Label used in the summary map's description column
///
/// Tree nodes are named after the tree they belong to, taken from the
/// subtype. Other objects show their subtype only when it is set.
pub fn node_type_label(obj_type: u32, subtype: u32) -> String {
    let kind = ObjectType::from_code(obj_type);
    let sub = ObjectType::from_code(subtype);

    if kind.is_btree() {
        format!("{kind} ({sub})")
    } else if subtype != 0 {
        format!("{kind} / {sub}")
    } else {
        kind.to_string()
    }
}
