//! Point-in-time view of a participant's progress.

use serde::{Deserialize, Serialize};
use crate::Time;

/// A snapshot of one participant's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Participant name
    pub name: String,

    /// Progress at the time of the snapshot
    pub current_progress: i32,

    /// Upper bound on progress
    pub max_progress: i32,

    /// `current_progress / max_progress`, not clamped
    pub progress_factor: f32,

    /// Whether progress has reached `max_progress`
    pub finished: bool,

    /// When snapshot was taken
    pub timestamp: Time,
}

impl ProgressSnapshot {
    /// Fractional completion as a percentage.
    pub fn percentage(&self) -> f32 {
        self.progress_factor * 100.0
    }
}
