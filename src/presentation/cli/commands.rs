//! CLI arguments using clap

use crate::application::dto::DumpOptions;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// apfs-dump - APFS raw image diagnostic scanner
///
/// Walks every block of the APFS partition found in a raw disk image (or of
/// the whole image when no partition table is present), verifies each block
/// checksum and writes a structural dump of the verified blocks. An optional
/// block map summarizes the layout one row per block.
#[derive(Parser, Debug)]
#[command(name = "apfs-dump")]
#[command(version)]
#[command(about = "Dump the block structure of an APFS disk image", long_about = None)]
pub struct Cli {
    /// Path to the raw disk image or device (e.g., disk.img, /dev/sdb)
    pub input: PathBuf,

    /// Report file for the structural dump
    pub output: PathBuf,

    /// Optional report file for the block map
    pub map: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Also dump blocks that fail checksum verification, as hex
    #[arg(long)]
    pub raw_invalid: bool,

    /// Leave the hex payload out of node entries
    #[arg(long)]
    pub no_text: bool,
}

impl Cli {
    /// Options for the structural dump pass
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions::new()
            .with_text(!self.no_text)
            .with_raw_invalid(self.raw_invalid)
    }

    /// Log level selected by `-v` / `-d`
    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.verbose {
            Level::INFO
        } else {
            Level::WARN
        }
    }
}
