//! Azure OpenAI backend.

use std::time::Duration;

use tracing::debug;

use crate::error::InferenceError;
use crate::{DEFAULT_API_VERSION, Result, StructuredBackend, StructuredReply, StructuredRequest};

use super::{build_client, send_completion};

/// Backend calling a chat completions deployment on Azure OpenAI.
pub struct AzureOpenAiBackend {
    client: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
}

impl AzureOpenAiBackend {
    /// Create a backend for `deployment` on the resource at `endpoint`.
    pub fn new(
        endpoint: &str,
        deployment: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if endpoint.trim().is_empty() {
            return Err(InferenceError::NotConfigured("Azure endpoint is empty".to_string()));
        }
        if deployment.trim().is_empty() {
            return Err(InferenceError::NotConfigured("Azure deployment is empty".to_string()));
        }
        if api_key.trim().is_empty() {
            return Err(InferenceError::NotConfigured("Azure API key is empty".to_string()));
        }

        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment: deployment.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Override the REST API version.
    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    /// Full URL of the chat completions operation.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

impl StructuredBackend for AzureOpenAiBackend {
    async fn complete(&self, request: &StructuredRequest) -> Result<StructuredReply> {
        let url = self.completions_url();
        debug!("Azure OpenAI completion on deployment {}", self.deployment);

        let builder = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&request.to_body(None));

        send_completion(builder).await
    }

    fn name(&self) -> &str {
        "azure-openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let backend = AzureOpenAiBackend::new(
            "https://example.openai.azure.com/",
            "invoices",
            "secret",
            Duration::from_secs(5),
        )
        .unwrap()
        .with_api_version("2024-02-01");

        assert_eq!(
            backend.completions_url(),
            "https://example.openai.azure.com/openai/deployments/invoices/chat/completions?api-version=2024-02-01"
        );
    }

    #[test]
    fn test_missing_configuration() {
        let result = AzureOpenAiBackend::new("", "invoices", "secret", Duration::from_secs(5));
        assert!(matches!(result, Err(InferenceError::NotConfigured(_))));

        let result = AzureOpenAiBackend::new(
            "https://example.openai.azure.com",
            "invoices",
            "  ",
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(InferenceError::NotConfigured(_))));
    }
}
