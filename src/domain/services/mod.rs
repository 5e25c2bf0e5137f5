//! Domain services
//!
//! Scan-wide services that operate on domain entities.

mod cancellation;
mod classifier;

pub use cancellation::CancellationToken;
pub use classifier::classify;
