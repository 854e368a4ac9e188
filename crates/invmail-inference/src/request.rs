//! Request and reply types for structured completions.

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::InferenceError;
use crate::Result;

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// JSON schema the model output must conform to.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    /// Schema name reported to the service.
    pub name: String,
    /// The JSON schema document.
    pub schema: Value,
    /// Ask the service to enforce the schema strictly.
    pub strict: bool,
}

/// A structured completion request.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub messages: Vec<ChatMessage>,
    pub schema: OutputSchema,
    /// Sampling temperature, `None` leaves the service default.
    pub temperature: Option<f32>,
}

impl StructuredRequest {
    pub fn new(schema: OutputSchema) -> Self {
        Self {
            messages: Vec::new(),
            schema,
            temperature: Some(0.0),
        }
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the chat completions request body.
    ///
    /// `model` is omitted for deployments that encode it in the URL.
    pub fn to_body(&self, model: Option<&str>) -> Value {
        let mut body = json!({
            "messages": self.messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": self.schema.name,
                    "schema": self.schema.schema,
                    "strict": self.schema.strict,
                }
            }
        });

        if let Some(model) = model {
            body["model"] = json!(model);
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

/// Outcome of a completion that reached the model.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredReply {
    /// Schema-conforming JSON produced by the model.
    Parsed(Value),
    /// The model declined to answer.
    Refusal(String),
}

impl StructuredReply {
    /// Read the first choice of a chat completions response.
    pub fn from_completion(response: &Value) -> Result<Self> {
        let message = response
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.get("message"))
            .ok_or_else(|| InferenceError::InvalidResponse("no choices in response".to_string()))?;

        if let Some(refusal) = message.get("refusal").and_then(|r| r.as_str()) {
            return Ok(StructuredReply::Refusal(refusal.to_string()));
        }

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| InferenceError::InvalidResponse("message has no content".to_string()))?;

        let parsed: Value = serde_json::from_str(content)
            .map_err(|e| InferenceError::InvalidResponse(format!("content is not JSON: {}", e)))?;

        Ok(StructuredReply::Parsed(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema() -> OutputSchema {
        OutputSchema {
            name: "test".to_string(),
            schema: json!({"type": "object"}),
            strict: true,
        }
    }

    #[test]
    fn test_body_shape() {
        let request = StructuredRequest::new(schema())
            .with_message(ChatMessage::system("sys"))
            .with_message(ChatMessage::user("hello"));

        let body = request.to_body(Some("gpt-4o-mini"));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["temperature"], 0.0);
    }

    #[test]
    fn test_body_without_model() {
        let body = StructuredRequest::new(schema())
            .with_temperature(None)
            .to_body(None);

        assert!(body.get("model").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_reply_parsed() {
        let response = json!({
            "choices": [{
                "message": {"content": "{\"vendor\": \"ACME\"}", "refusal": null}
            }]
        });

        let reply = StructuredReply::from_completion(&response).unwrap();
        assert_eq!(reply, StructuredReply::Parsed(json!({"vendor": "ACME"})));
    }

    #[test]
    fn test_reply_refusal() {
        let response = json!({
            "choices": [{
                "message": {"content": null, "refusal": "I can't help with that."}
            }]
        });

        let reply = StructuredReply::from_completion(&response).unwrap();
        assert_eq!(reply, StructuredReply::Refusal("I can't help with that.".to_string()));
    }

    #[test]
    fn test_reply_invalid() {
        assert!(StructuredReply::from_completion(&json!({"choices": []})).is_err());

        let not_json = json!({"choices": [{"message": {"content": "not json"}}]});
        assert!(matches!(
            StructuredReply::from_completion(&not_json),
            Err(InferenceError::InvalidResponse(_))
        ));
    }
}
