use thiserror::Error;

#[derive(Debug, Error)]
pub enum EsgAnalyticsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Malformed observation at index {index}: {field} — {reason}")]
    MalformedObservation {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("Series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for EsgAnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        EsgAnalyticsError::SerializationError(e.to_string())
    }
}
