//! Run sequence
//!
//! Opens the image, resolves the partition range, writes the block map when
//! one was asked for and then the structural dump. Each report file is
//! closed before the next pass starts.

use super::{Cli, CliError};
use crate::application::dto::ScanStats;
use crate::application::{resolve_bounds, MapBlocksUseCase, ScanBlocksUseCase};
use crate::domain::entities::PartitionBounds;
use crate::domain::repositories::BlockDevice;
use crate::domain::services::CancellationToken;
use crate::infrastructure::apfs::{ApfsBlockVerifier, ApfsNodeDumper};
use crate::infrastructure::block_device::DeviceReader;
use crate::infrastructure::partition::GptPartitionMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

/// What a completed run covered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub bounds: PartitionBounds,
    /// Block map statistics, absent when no map file was given
    pub map: Option<ScanStats>,
    pub dump: ScanStats,
}

impl RunReport {
    /// Whether either pass stopped early on cancellation
    pub fn cancelled(&self) -> bool {
        self.dump.cancelled || self.map.as_ref().is_some_and(|m| m.cancelled)
    }
}

fn create_report(path: &Path) -> Result<BufWriter<File>, CliError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| CliError::OutputOpen {
            path: path.to_path_buf(),
            source,
        })
}

/// Runs both passes for `cli`
pub fn run(cli: &Cli, cancel: &CancellationToken) -> Result<RunReport, CliError> {
    let mut device = DeviceReader::open(&cli.input).map_err(|source| CliError::DeviceOpen {
        path: cli.input.clone(),
        source,
    })?;
    debug!(
        path = %cli.input.display(),
        size = device.size(),
        mmap = device.is_mmap(),
        "device opened"
    );

    let mut partitions = GptPartitionMap::new();
    let bounds = resolve_bounds(&mut device, &mut partitions);

    let verifier = ApfsBlockVerifier::new();
    let dumper = ApfsNodeDumper::new();

    let map = match &cli.map {
        Some(path) => {
            let mut out = create_report(path)?;
            let stats = MapBlocksUseCase::new(&verifier, &dumper)
                .execute(&mut device, bounds, &mut out, cancel)
                .map_err(|source| CliError::Scan {
                    report: "block map",
                    source,
                })?;
            drop(out);
            Some(stats)
        }
        None => None,
    };

    // after a cancelled map pass the dump report is created but stays empty
    let mut out = create_report(&cli.output)?;
    let dump = ScanBlocksUseCase::new(&verifier, dumper, cli.dump_options())
        .execute(&mut device, bounds, &mut out, cancel)
        .map_err(|source| CliError::Scan {
            report: "structural dump",
            source,
        })?;

    info!(%bounds, "reports written");
    Ok(RunReport { bounds, map, dump })
}
