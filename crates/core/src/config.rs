//! Participant and race configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{RaceError, Result};

/// Construction parameters for a single race participant.
///
/// `initial_progress` is deliberately left unvalidated: a participant may be
/// seeded above `max_progress` or below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantConfig {
    /// Participant label
    pub name: String,

    /// Upper bound on progress (must be > 0)
    #[serde(default = "default_max_progress")]
    pub max_progress: i32,

    /// Amount added per tick (must be > 0)
    #[serde(default = "default_progress_increment")]
    pub progress_increment: i32,

    /// Delay between ticks in milliseconds (must be >= 0)
    #[serde(default = "default_progress_delay_millis")]
    pub progress_delay_millis: i64,

    /// Starting progress
    #[serde(default)]
    pub initial_progress: i32,
}

fn default_max_progress() -> i32 {
    100
}

fn default_progress_increment() -> i32 {
    1
}

fn default_progress_delay_millis() -> i64 {
    500
}

impl ParticipantConfig {
    /// Create a configuration with default bounds.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_progress: default_max_progress(),
            progress_increment: default_progress_increment(),
            progress_delay_millis: default_progress_delay_millis(),
            initial_progress: 0,
        }
    }

    /// Set the upper bound on progress.
    pub fn max_progress(mut self, max_progress: i32) -> Self {
        self.max_progress = max_progress;
        self
    }

    /// Set the per-tick increment.
    pub fn progress_increment(mut self, increment: i32) -> Self {
        self.progress_increment = increment;
        self
    }

    /// Set the delay between ticks.
    pub fn progress_delay_millis(mut self, millis: i64) -> Self {
        self.progress_delay_millis = millis;
        self
    }

    /// Set the starting progress.
    pub fn initial_progress(mut self, progress: i32) -> Self {
        self.initial_progress = progress;
        self
    }

    /// Check the bounds a participant relies on for its whole lifetime.
    pub fn validate(&self) -> Result<()> {
        if self.max_progress <= 0 {
            return Err(RaceError::InvalidConfiguration(format!(
                "{}: max_progress must be > 0, got {}",
                self.name, self.max_progress
            )));
        }

        if self.progress_increment <= 0 {
            return Err(RaceError::InvalidConfiguration(format!(
                "{}: progress_increment must be > 0, got {}",
                self.name, self.progress_increment
            )));
        }

        if self.progress_delay_millis < 0 {
            return Err(RaceError::InvalidConfiguration(format!(
                "{}: progress_delay_millis must be >= 0, got {}",
                self.name, self.progress_delay_millis
            )));
        }

        Ok(())
    }

    /// Delay between ticks. Negative values map to zero; `validate` rejects them first.
    pub fn progress_delay(&self) -> Duration {
        Duration::from_millis(self.progress_delay_millis.max(0) as u64)
    }
}

/// A set of participants raced together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Participants, in display order
    pub participants: Vec<ParticipantConfig>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            participants: vec![
                ParticipantConfig::new("Player 1").progress_increment(1),
                ParticipantConfig::new("Player 2").progress_increment(2),
            ],
        }
    }
}

impl RaceConfig {
    /// Parse and validate a race from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a race file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Validate every participant.
    pub fn validate(&self) -> Result<()> {
        if self.participants.is_empty() {
            return Err(RaceError::InvalidConfiguration(
                "race has no participants".to_string(),
            ));
        }

        for participant in &self.participants {
            participant.validate()?;
        }

        Ok(())
    }
}
