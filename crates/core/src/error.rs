//! Error types for race configuration.

/// Result type for race operations.
pub type Result<T> = std::result::Result<T, RaceError>;

/// Errors that can occur while configuring a race.
///
/// The advancement loop itself never fails; cancelling it is normal control
/// flow, so every variant here is raised before a participant exists.
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    /// A participant parameter is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error while reading a race file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Race file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RaceError {
    /// Whether this error was caused by an invalid parameter value.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, RaceError::InvalidConfiguration(_))
    }
}
