//! Publishing error types.

/// Errors that can occur when publishing a record.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ingestion endpoint rejected the record
    #[error("ingest endpoint returned status {status}")]
    Status { status: u16 },

    /// Record couldn't be encoded for live subscribers
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credentials can't be encoded as a header
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}
