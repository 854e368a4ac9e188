//! Configuration structures for the extraction pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::invoice::{DEFAULT_CURRENCY, DEFAULT_SENDER_EMAIL, DEFAULT_VENDOR};

/// Main configuration for invmail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvmailConfig {
    /// Remote extractor configuration.
    pub remote: RemoteConfig,

    /// Invoice store configuration.
    pub store: StoreConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Which structured completion provider to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteProvider {
    #[default]
    Azure,
    #[serde(rename = "openai")]
    OpenAi,
    /// Never call out; regex extraction only.
    Disabled,
}

/// Remote extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Provider to use.
    pub provider: RemoteProvider,

    /// Azure OpenAI resource endpoint.
    pub endpoint: String,

    /// Azure deployment name, or OpenAI model name.
    pub deployment: String,

    /// Azure REST API version.
    pub api_version: String,

    /// API key. Usually supplied via the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for OpenAI-compatible servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// HTTP timeout for one completion.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            provider: RemoteProvider::Azure,
            endpoint: String::new(),
            deployment: "gpt-4o-mini".to_string(),
            api_version: invmail_inference::DEFAULT_API_VERSION.to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 60,
        }
    }
}

/// Invoice store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Supabase project URL.
    pub url: String,

    /// Supabase anon key. Usually supplied via the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,

    /// Table holding invoices.
    pub table: String,

    /// HTTP timeout for one store call.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: None,
            table: "invoices".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Vendor when none is found.
    pub default_vendor: String,

    /// Currency when none is found.
    pub default_currency: String,

    /// Sender when none is found.
    pub default_sender_email: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_vendor: DEFAULT_VENDOR.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            default_sender_email: DEFAULT_SENDER_EMAIL.to_string(),
        }
    }
}

impl InvmailConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay values from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; empty values are ignored.
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get("AZURE_OPENAI_ENDPOINT") {
            self.remote.endpoint = endpoint;
        }
        if let Some(deployment) = get("AZURE_OPENAI_DEPLOYMENT") {
            self.remote.deployment = deployment;
        }
        if let Some(version) = get("AZURE_OPENAI_API_VERSION") {
            self.remote.api_version = version;
        }
        match self.remote.provider {
            RemoteProvider::Azure => {
                if let Some(key) = get("AZURE_OPENAI_API_KEY") {
                    self.remote.api_key = Some(key);
                }
            }
            RemoteProvider::OpenAi => {
                if let Some(key) = get("OPENAI_API_KEY") {
                    self.remote.api_key = Some(key);
                }
            }
            RemoteProvider::Disabled => {}
        }
        if let Some(url) = get("SUPABASE_URL") {
            self.store.url = url;
        }
        if let Some(key) = get("SUPABASE_ANON_KEY") {
            self.store.anon_key = Some(key);
        }

        self
    }
}
