//! APFS object checksum
//!
//! Fletcher-64 over 32-bit little-endian words, computed over everything
//! after the 8-byte checksum field and stored in that field.

const MOD: u64 = 0xFFFF_FFFF;

/// Computes the Fletcher-64 checksum APFS stores in an object header
///
/// `data` is the object minus its checksum field. Trailing bytes that do not
/// fill a whole word are ignored.
pub fn fletcher64(data: &[u8]) -> u64 {
    let mut sum1: u64 = 0;
    let mut sum2: u64 = 0;

    for word in data.chunks_exact(4) {
        let w = u32::from_le_bytes([word[0], word[1], word[2], word[3]]) as u64;
        sum1 = (sum1 + w) % MOD;
        sum2 = (sum2 + sum1) % MOD;
    }

    let c1 = MOD - ((sum1 + sum2) % MOD);
    let c2 = MOD - ((sum1 + c1) % MOD);
    (c2 << 32) | c1
}

/// Checks the stored checksum of an object
///
/// A stored value of zero or all ones never verifies; both are what
/// unwritten or erased storage looks like.
pub fn verify_object(object: &[u8]) -> bool {
    if object.len() < 8 {
        return false;
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&object[..8]);
    let stored = u64::from_le_bytes(raw);

    if stored == 0 || stored == u64::MAX {
        return false;
    }
    stored == fletcher64(&object[8..])
}

/// Computes and stores the checksum of an object in place
pub fn seal_object(object: &mut [u8]) {
    if object.len() < 8 {
        return;
    }
    let checksum = fletcher64(&object[8..]);
    object[..8].copy_from_slice(&checksum.to_le_bytes());
}
