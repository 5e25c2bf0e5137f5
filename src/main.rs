use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, warn};

use apfs_dump::domain::services::CancellationToken;
use apfs_dump::presentation::cli::{self, Cli, CliError};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            return match CliError::from_parse(&err) {
                None => {
                    let _ = err.print();
                    ExitCode::SUCCESS
                }
                Some(usage) => {
                    eprintln!("{usage}");
                    ExitCode::from(&usage)
                }
            };
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cancel = CancellationToken::new();
    if let Err(e) = install_interrupt_handler(&cancel) {
        warn!("{e:#}");
    }

    match cli::run(&cli, &cancel) {
        Ok(report) => {
            if report.cancelled() {
                warn!("interrupted, reports hold a prefix of the scan");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!(error = ?e, "run failed");
            eprintln!("apfs-dump: {e}");
            ExitCode::from(&e)
        }
    }
}

fn install_interrupt_handler(cancel: &CancellationToken) -> Result<()> {
    let token = cancel.clone();
    ctrlc::set_handler(move || token.cancel()).context("Failed to set Ctrl+C handler")
}
