//! Presentation layer
//!
//! The command line surface: argument parsing, the run sequence and the
//! mapping of failures onto process exit codes.

pub mod cli;
