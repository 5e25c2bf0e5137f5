//! Errors raised by the report passes

use crate::domain::repositories::DeviceError;
use std::io;
use thiserror::Error;

/// Fatal failure during a report pass
///
/// Neither variant is retried; the pass stops at the failing block.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read block {index:#x}: {source}")]
    Read {
        index: u64,
        #[source]
        source: DeviceError,
    },

    #[error("failed to write report: {0}")]
    Write(#[from] io::Error),
}
