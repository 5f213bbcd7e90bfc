//! Participant Progress Engine
//!
//! Bounded, resumable progress counters and the handles that start, pause,
//! resume and reset their advancement loops.

#![warn(missing_docs)]

pub mod participant;
pub mod runner;

pub use participant::{Participant, RunOutcome};
pub use runner::RaceRunner;
