//! OpenAI backend.

use std::time::Duration;

use tracing::debug;

use crate::error::InferenceError;
use crate::{Result, StructuredBackend, StructuredReply, StructuredRequest};

use super::{build_client, send_completion};

/// Public OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Backend calling the OpenAI chat completions API.
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(InferenceError::NotConfigured("OpenAI API key is empty".to_string()));
        }

        Ok(Self {
            client: build_client(timeout)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Point the backend at a compatible server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

impl StructuredBackend for OpenAiBackend {
    async fn complete(&self, request: &StructuredRequest) -> Result<StructuredReply> {
        debug!("OpenAI completion with model {}", self.model);

        let builder = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request.to_body(Some(&self.model)));

        send_completion(builder).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let backend = OpenAiBackend::new("gpt-4o-mini", "sk-test", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:8080/");

        assert_eq!(backend.completions_url(), "http://localhost:8080/v1/chat/completions");
    }
}
