//! Error types for the inference layer.

use thiserror::Error;

/// Errors that can occur during a structured completion call.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The backend is missing endpoint, deployment or credentials.
    #[error("backend not configured: {0}")]
    NotConfigured(String),

    /// Failed to build the HTTP client.
    #[error("failed to create client: {0}")]
    ClientCreate(String),

    /// The request never produced an HTTP response (connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response did not have the expected chat completion shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Http(format!("request timed out: {}", err))
        } else if err.is_decode() {
            InferenceError::InvalidResponse(err.to_string())
        } else {
            InferenceError::Http(err.to_string())
        }
    }
}
