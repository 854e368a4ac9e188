//! Structured-output completion layer for invmail.
//!
//! This crate provides a unified interface for asking a hosted language model
//! for JSON that conforms to a schema:
//! - Azure OpenAI deployments (`azure` feature)
//! - the OpenAI API or compatible servers (`openai` feature)

mod backend;
mod error;
mod request;

pub use backend::StructuredBackend;
pub use error::InferenceError;
pub use request::{ChatMessage, OutputSchema, Role, StructuredReply, StructuredRequest};

#[cfg(feature = "azure")]
pub use backend::azure::AzureOpenAiBackend;

#[cfg(feature = "openai")]
pub use backend::openai::OpenAiBackend;

/// Azure REST API version used when none is configured.
///
/// Structured outputs need `2024-08-01-preview` or later.
pub const DEFAULT_API_VERSION: &str = "2024-08-01-preview";

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
