//! APFS raw image diagnostic scanner
//!
//! Reads a raw disk image block by block, classifies every block of the
//! APFS partition as empty, a checksum-verified object or unverified data,
//! and writes two text reports: a compact block map and a structural dump
//! of the verified objects.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod utils;
