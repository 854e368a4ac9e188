//! Structured completion backend implementations.

#[cfg(feature = "azure")]
pub mod azure;

#[cfg(feature = "openai")]
pub mod openai;

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::InferenceError;
use crate::{Result, StructuredReply, StructuredRequest};

/// Trait for structured-output completion backends.
///
/// This trait abstracts over hosted chat completion providers so that
/// callers can swap the real service for canned responses in tests.
pub trait StructuredBackend: Send + Sync {
    /// Run one completion and return the model's structured reply.
    ///
    /// A refusal is a successful call and is reported as
    /// [`StructuredReply::Refusal`], not as an error.
    fn complete(
        &self,
        request: &StructuredRequest,
    ) -> impl Future<Output = Result<StructuredReply>> + Send;

    /// Short provider name used in logs.
    fn name(&self) -> &str;
}

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| InferenceError::ClientCreate(e.to_string()))
}

/// Send a prepared request and decode the chat completion reply.
pub(crate) async fn send_completion(request: reqwest::RequestBuilder) -> Result<StructuredReply> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InferenceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let value: Value = response.json().await?;
    debug!("Completion response received");

    StructuredReply::from_completion(&value)
}
