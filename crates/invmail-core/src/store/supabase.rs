//! Supabase (PostgREST) invoice store.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::config::StoreConfig;
use crate::models::invoice::{InvoiceRecord, NewInvoiceRow, StoredInvoice};

use super::{InvoiceStore, Result};

/// Store backed by a table in a Supabase project.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    table: String,
}

impl SupabaseStore {
    /// Create a store for `table` in the project at `url`.
    pub fn new(url: &str, anon_key: &str, table: &str, timeout: Duration) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(StoreError::NotConfigured("Supabase URL is empty".to_string()));
        }
        if anon_key.trim().is_empty() {
            return Err(StoreError::NotConfigured("Supabase key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(anon_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", anon_key))?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            table: table.to_string(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(
            &config.url,
            config.anon_key.as_deref().unwrap_or_default(),
            &config.table,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// REST endpoint of the invoice table.
    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| StoreError::NotConfigured(format!("invalid key: {}", e)))
}

impl InvoiceStore for SupabaseStore {
    async fn save(&self, record: &InvoiceRecord) -> Result<StoredInvoice> {
        let row = NewInvoiceRow::from(record);
        debug!("Inserting invoice into {}", self.table);

        let response = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        let rows: Vec<StoredInvoice> = Self::check(response).await?.json().await?;
        let stored = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))?;

        info!("Saved invoice from {} to {}", stored.vendor, self.table);
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredInvoice>> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        let rows: Vec<StoredInvoice> = Self::check(response).await?.json().await?;
        debug!("Listed {} invoices from {}", rows.len(), self.table);
        Ok(rows)
    }
}
