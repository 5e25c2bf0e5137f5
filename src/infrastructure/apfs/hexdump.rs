//! Hex dump rendering for node payloads and raw blocks

use std::io::{self, Write};

const BYTES_PER_LINE: usize = 16;

/// Length of `data` with trailing zero bytes dropped, rounded up to a full line
pub fn trimmed_len(data: &[u8]) -> usize {
    match data.iter().rposition(|&b| b != 0) {
        Some(last) => ((last + BYTES_PER_LINE) & !(BYTES_PER_LINE - 1)).min(data.len()),
        None => 0,
    }
}

/// Writes `data` as `OFFSET: HEX BYTES  ASCII`, 16 bytes per line
pub fn write_hex_dump<W: Write + ?Sized>(out: &mut W, data: &[u8]) -> io::Result<()> {
    for (i, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let mut line = format!("{:04X}:", i * BYTES_PER_LINE);

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                line.push(' ');
            }
            line.push_str(&format!(" {byte:02X}"));
        }
        for j in chunk.len()..BYTES_PER_LINE {
            if j == 8 {
                line.push(' ');
            }
            line.push_str("   ");
        }

        line.push_str("  ");
        line.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));

        writeln!(out, "{line}")?;
    }
    Ok(())
}
