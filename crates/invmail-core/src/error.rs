//! Error types for the invmail-core library.

use thiserror::Error;

/// Reasons a remote extraction produced no record.
///
/// Both variants are recovered by the heuristic fallback; the distinction is
/// kept for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// The model declined to answer.
    #[error("model refused the request: {0}")]
    Refusal(String),

    /// The call failed or the reply could not be read.
    #[error("remote call failed: {0}")]
    Transport(String),
}

impl RemoteFailure {
    /// Stable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            RemoteFailure::Refusal(_) => "refusal",
            RemoteFailure::Transport(_) => "transport-error",
        }
    }
}

/// Errors related to invoice persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store is missing URL or key.
    #[error("store not configured: {0}")]
    NotConfigured(String),

    /// The request never reached the store.
    #[error("store request failed: {0}")]
    Http(String),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The store reply could not be decoded.
    #[error("failed to decode store reply: {0}")]
    Decode(String),

    /// The in-process store is unusable.
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

/// Errors related to configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for the config schema.
    #[error("invalid config: {0}")]
    Format(#[from] serde_json::Error),
}
