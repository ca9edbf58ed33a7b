//! Error types for session tracking and reporting

use thiserror::Error;

/// Everything that can go wrong while tracking or reporting a session.
///
/// None of these leave the public tracker operations; they end up in a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// Identity was empty at init, or never set when a report was due.
    #[error("user ID is required to track time")]
    MissingIdentity,

    /// The request never produced a response (connection refused, reset, DNS...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// No response within the configured bound.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Collector answered with a non-2xx status.
    #[error("collector responded {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TrackError {
    /// Configuration errors are caused locally; everything else happened on the wire.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TrackError::MissingIdentity | TrackError::InvalidConfig(_))
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(e: serde_json::Error) -> Self {
        TrackError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
