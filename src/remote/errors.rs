//! Store error types
//!
//! Transport and server failures surfaced by the remote media API client.
//! A natural-key conflict is not an error (see [`crate::remote::AddOutcome`]).

/// Remote store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({0}): {1}")]
    Server(u16, String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Request error: {0}")]
    Request(String),
}

impl StoreError {
    /// Whether this error is a transient transport-level failure that a
    /// read path may recover from by serving cached data
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout | StoreError::Network(_) | StoreError::Server(_, _)
        )
    }

    /// Create a StoreError from an HTTP status code and response body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            408 => StoreError::Timeout,
            500..=599 => StoreError::Server(status, body.to_string()),
            _ => StoreError::Request(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connect() || err.is_request() {
            StoreError::Network(err.to_string())
        } else if err.is_decode() {
            StoreError::Malformed(err.to_string())
        } else {
            StoreError::Request(err.to_string())
        }
    }
}
