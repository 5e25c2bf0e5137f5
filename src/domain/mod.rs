//! Domain layer - block model and scan logic
//!
//! This module contains the block entities, the collaborator traits, and
//! the classification and cancellation services. It has no knowledge of
//! any concrete device or on-disk format beyond the block header layout.

pub mod entities;
pub mod repositories;
pub mod services;
