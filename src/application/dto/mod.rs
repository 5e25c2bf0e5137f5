//! Data Transfer Objects

mod dump_options;
mod scan_stats;

pub use dump_options::DumpOptions;
pub use scan_stats::ScanStats;
