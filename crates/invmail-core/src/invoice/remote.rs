//! Remote field extraction through a structured-output model.

use std::future::Future;
#[cfg(any(feature = "azure", feature = "openai"))]
use std::time::Duration;

use invmail_inference::{
    ChatMessage, InferenceError, OutputSchema, StructuredBackend, StructuredReply,
    StructuredRequest,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::RemoteFailure;
use crate::models::config::{RemoteConfig, RemoteProvider};
use crate::models::invoice::{PartialInvoice, DEFAULT_CURRENCY};

#[cfg(feature = "azure")]
use invmail_inference::AzureOpenAiBackend;
#[cfg(feature = "openai")]
use invmail_inference::OpenAiBackend;

const SYSTEM_PROMPT: &str = "You read invoice emails and extract structured invoice data. \
Return only the fields defined in the schema: vendor (supplier name), total (numeric amount), \
currency (three-letter code such as 'USD'), invoice_date (YYYY-MM-DD if possible), \
sender_email (address of the sender if available). \
If a value is missing or not clear, set it to null.";

const SCHEMA_NAME: &str = "invoice_info";

/// Source of a partial invoice for an email body.
pub trait RemoteExtractor: Send + Sync {
    /// Extract whatever invoice fields the source can find in `body`.
    fn extract(
        &self,
        body: &str,
    ) -> impl Future<Output = Result<PartialInvoice, RemoteFailure>> + Send;
}

/// JSON schema of the five invoice fields, each nullable.
pub fn invoice_schema() -> OutputSchema {
    OutputSchema {
        name: SCHEMA_NAME.to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "vendor": { "type": ["string", "null"] },
                "total": { "type": ["number", "null"] },
                "currency": { "type": ["string", "null"] },
                "invoice_date": { "type": ["string", "null"] },
                "sender_email": { "type": ["string", "null"] }
            },
            "required": ["vendor", "total", "currency", "invoice_date", "sender_email"],
            "additionalProperties": false
        }),
        strict: true,
    }
}

/// Extractor that asks a hosted model for the invoice fields.
pub struct LlmRemoteExtractor<B> {
    backend: B,
}

impl<B: StructuredBackend> LlmRemoteExtractor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn request(&self, body: &str) -> StructuredRequest {
        StructuredRequest::new(invoice_schema())
            .with_message(ChatMessage::system(SYSTEM_PROMPT))
            .with_message(ChatMessage::user(format!(
                "Read the following email and extract the invoice fields:\n\n{}",
                body
            )))
    }
}

impl<B: StructuredBackend> RemoteExtractor for LlmRemoteExtractor<B> {
    async fn extract(&self, body: &str) -> Result<PartialInvoice, RemoteFailure> {
        debug!("Requesting invoice fields from {}", self.backend.name());

        let result = match self.backend.complete(&self.request(body)).await {
            Ok(StructuredReply::Parsed(value)) => decode_partial(value),
            Ok(StructuredReply::Refusal(reason)) => Err(RemoteFailure::Refusal(reason)),
            Err(e) => Err(RemoteFailure::Transport(e.to_string())),
        };

        if let Err(failure) = &result {
            warn!(
                "{} extraction failed ({}): {}",
                self.backend.name(),
                failure.reason(),
                failure
            );
        }
        result
    }
}

fn decode_partial(value: Value) -> Result<PartialInvoice, RemoteFailure> {
    let partial: PartialInvoice = serde_json::from_value(value)
        .map_err(|e| RemoteFailure::Transport(format!("unreadable invoice fields: {}", e)))?;

    let mut partial = partial.normalized();
    if partial.currency.is_none() {
        partial.currency = Some(DEFAULT_CURRENCY.to_string());
    }

    debug!("Remote extraction missing fields: {:?}", partial.missing_fields());
    Ok(partial)
}

/// Extractor returning the same record for every body.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    record: PartialInvoice,
}

impl StaticExtractor {
    pub fn new(record: PartialInvoice) -> Self {
        Self { record }
    }
}

impl RemoteExtractor for StaticExtractor {
    async fn extract(&self, _body: &str) -> Result<PartialInvoice, RemoteFailure> {
        Ok(self.record.clone())
    }
}

/// Extractor that always fails, leaving extraction to the heuristics.
#[derive(Debug, Clone)]
pub struct UnavailableExtractor {
    detail: String,
}

impl UnavailableExtractor {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

impl Default for UnavailableExtractor {
    fn default() -> Self {
        Self::new("remote extraction disabled")
    }
}

impl RemoteExtractor for UnavailableExtractor {
    async fn extract(&self, _body: &str) -> Result<PartialInvoice, RemoteFailure> {
        Err(RemoteFailure::Transport(self.detail.clone()))
    }
}

/// Remote extractor selected by configuration.
pub enum ConfiguredExtractor {
    #[cfg(feature = "azure")]
    Azure(LlmRemoteExtractor<AzureOpenAiBackend>),
    #[cfg(feature = "openai")]
    OpenAi(LlmRemoteExtractor<OpenAiBackend>),
    Unavailable(UnavailableExtractor),
}

impl ConfiguredExtractor {
    /// Build the extractor for `config.provider`.
    ///
    /// Missing endpoint, deployment or key is an error; a `disabled` provider
    /// yields an extractor that always falls back.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, InferenceError> {
        match config.provider {
            RemoteProvider::Disabled => Ok(Self::offline()),

            #[cfg(feature = "azure")]
            RemoteProvider::Azure => {
                let backend = AzureOpenAiBackend::new(
                    &config.endpoint,
                    &config.deployment,
                    config.api_key.as_deref().unwrap_or_default(),
                    Duration::from_secs(config.timeout_secs),
                )?
                .with_api_version(&config.api_version);
                Ok(Self::Azure(LlmRemoteExtractor::new(backend)))
            }

            #[cfg(feature = "openai")]
            RemoteProvider::OpenAi => {
                let mut backend = OpenAiBackend::new(
                    &config.deployment,
                    config.api_key.as_deref().unwrap_or_default(),
                    Duration::from_secs(config.timeout_secs),
                )?;
                if let Some(base_url) = &config.base_url {
                    backend = backend.with_base_url(base_url);
                }
                Ok(Self::OpenAi(LlmRemoteExtractor::new(backend)))
            }

            #[allow(unreachable_patterns)]
            other => Err(InferenceError::NotConfigured(format!(
                "provider {:?} is not compiled in",
                other
            ))),
        }
    }

    /// Extractor that never calls out.
    pub fn offline() -> Self {
        Self::Unavailable(UnavailableExtractor::default())
    }

    /// Short name for logs and summaries.
    pub fn name(&self) -> &str {
        match self {
            #[cfg(feature = "azure")]
            Self::Azure(e) => e.backend().name(),
            #[cfg(feature = "openai")]
            Self::OpenAi(e) => e.backend().name(),
            Self::Unavailable(_) => "offline",
        }
    }
}

impl RemoteExtractor for ConfiguredExtractor {
    async fn extract(&self, body: &str) -> Result<PartialInvoice, RemoteFailure> {
        match self {
            #[cfg(feature = "azure")]
            Self::Azure(e) => e.extract(body).await,
            #[cfg(feature = "openai")]
            Self::OpenAi(e) => e.extract(body).await,
            Self::Unavailable(e) => e.extract(body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Mutex;

    enum Canned {
        Reply(StructuredReply),
        Status(u16),
    }

    struct MockBackend {
        canned: Canned,
        seen: Mutex<Vec<StructuredRequest>>,
    }

    impl MockBackend {
        fn new(canned: Canned) -> Self {
            Self { canned, seen: Mutex::new(Vec::new()) }
        }
    }

    impl StructuredBackend for MockBackend {
        async fn complete(
            &self,
            request: &StructuredRequest,
        ) -> invmail_inference::Result<StructuredReply> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.canned {
                Canned::Reply(reply) => Ok(reply.clone()),
                Canned::Status(status) => Err(InferenceError::Status {
                    status: *status,
                    body: "unavailable".to_string(),
                }),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_parsed_reply_normalized() {
        let backend = MockBackend::new(Canned::Reply(StructuredReply::Parsed(json!({
            "vendor": "ACME Corp",
            "total": 249.99,
            "currency": null,
            "invoice_date": "2025-01-01",
            "sender_email": " "
        }))));
        let extractor = LlmRemoteExtractor::new(backend);

        let partial = extractor.extract("Total: $249.99").await.unwrap();

        assert_eq!(partial.vendor.as_deref(), Some("ACME Corp"));
        assert_eq!(partial.total, Some(Decimal::from_str("249.99").unwrap()));
        assert_eq!(partial.currency.as_deref(), Some("USD"));
        assert_eq!(partial.sender_email, None);

        let seen = extractor.backend().seen.lock().unwrap();
        let body = seen[0].to_body(None);
        assert_eq!(body["response_format"]["json_schema"]["name"], SCHEMA_NAME);
        assert!(seen[0].messages[1].content.ends_with("Total: $249.99"));
    }

    #[tokio::test]
    async fn test_refusal_reported() {
        let backend = MockBackend::new(Canned::Reply(StructuredReply::Refusal(
            "cannot comply".to_string(),
        )));
        let failure = LlmRemoteExtractor::new(backend).extract("x").await.unwrap_err();

        assert_eq!(failure, RemoteFailure::Refusal("cannot comply".to_string()));
        assert_eq!(failure.reason(), "refusal");
    }

    #[tokio::test]
    async fn test_http_error_is_transport() {
        let backend = MockBackend::new(Canned::Status(503));
        let failure = LlmRemoteExtractor::new(backend).extract("x").await.unwrap_err();
        assert_eq!(failure.reason(), "transport-error");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_transport() {
        let backend = MockBackend::new(Canned::Reply(StructuredReply::Parsed(json!({
            "total": "a lot"
        }))));
        let failure = LlmRemoteExtractor::new(backend).extract("x").await.unwrap_err();
        assert!(matches!(failure, RemoteFailure::Transport(_)));
    }

    #[test]
    fn test_schema_is_strict_and_closed() {
        let schema = invoice_schema();
        assert!(schema.strict);
        assert_eq!(schema.schema["additionalProperties"], false);
        assert_eq!(schema.schema["required"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_static_and_unavailable() {
        let record = PartialInvoice {
            vendor: Some("Globex".to_string()),
            ..Default::default()
        };
        assert_eq!(StaticExtractor::new(record.clone()).extract("x").await, Ok(record));
        assert!(UnavailableExtractor::default().extract("x").await.is_err());
    }

    #[test]
    fn test_disabled_provider_is_offline() {
        let config = RemoteConfig {
            provider: RemoteProvider::Disabled,
            ..Default::default()
        };
        let extractor = ConfiguredExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.name(), "offline");
    }

    #[cfg(feature = "azure")]
    #[test]
    fn test_azure_without_endpoint_rejected() {
        let config = RemoteConfig::default();
        assert!(matches!(
            ConfiguredExtractor::from_config(&config),
            Err(InferenceError::NotConfigured(_))
        ));
    }
}
