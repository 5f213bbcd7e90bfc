//! Race tracker core data models.
//!
//! This crate defines the configuration, error and snapshot types shared by
//! the progress engine and its orchestrators.

#![warn(missing_docs)]

mod config;
mod error;
mod snapshot;

pub use config::{ParticipantConfig, RaceConfig};
pub use error::{RaceError, Result};
pub use snapshot::ProgressSnapshot;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
