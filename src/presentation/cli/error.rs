//! CLI errors and exit codes

use crate::application::ScanError;
use crate::domain::repositories::DeviceError;
use clap::error::ErrorKind;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Fatal conditions reported by the binary, each with its own exit code
#[derive(Error, Debug)]
pub enum CliError {
    #[error("usage: apfs-dump <input> <output> [map]")]
    Usage,

    #[error("cannot open device {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: DeviceError,
    },

    #[error("cannot open output {}: {source}", path.display())]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{report} failed: {source}")]
    Scan {
        report: &'static str,
        #[source]
        source: ScanError,
    },
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage => 1,
            CliError::DeviceOpen { .. } => 2,
            CliError::OutputOpen { .. } => 3,
            CliError::Scan { .. } => 4,
        }
    }

    /// Maps a rejected command line onto the usage failure
    ///
    /// Returns `None` for `--help` and `--version`, which clap reports as
    /// errors but which end the process successfully.
    pub fn from_parse(err: &clap::Error) -> Option<Self> {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
            _ => Some(CliError::Usage),
        }
    }
}

impl From<&CliError> for ExitCode {
    fn from(err: &CliError) -> Self {
        ExitCode::from(err.exit_code())
    }
}
