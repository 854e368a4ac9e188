//! In-process invoice store.

use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use crate::error::StoreError;
use crate::models::invoice::{InvoiceRecord, NewInvoiceRow, StoredInvoice};

use super::{InvoiceStore, Result};

/// Store keeping records in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredInvoice>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InvoiceStore for MemoryStore {
    async fn save(&self, record: &InvoiceRecord) -> Result<StoredInvoice> {
        let stored = NewInvoiceRow::from(record).into_stored(Utc::now());

        let mut rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.push(stored.clone());
        debug!("Stored invoice from {} ({} rows)", stored.vendor, rows.len());

        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredInvoice>> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Insertion order breaks ties between equal timestamps.
        Ok(rows.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::InvoiceDate;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(vendor: &str, date: InvoiceDate) -> InvoiceRecord {
        InvoiceRecord {
            vendor: vendor.to_string(),
            total: Decimal::from_str("99.90").unwrap(),
            currency: "USD".to_string(),
            invoice_date: date,
            sender_email: "billing@acme.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_date_round_trip() {
        let store = MemoryStore::new();
        let structured = InvoiceDate::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let text = InvoiceDate::from("2025-02-03".to_string());

        store.save(&record("A", structured.clone())).await.unwrap();
        store.save(&record("B", text.clone())).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].invoice_date, text.to_iso_string());
        assert_eq!(listed[1].invoice_date, "2025-01-01");
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = MemoryStore::new();
        for vendor in ["first", "second", "third"] {
            store
                .save(&record(vendor, InvoiceDate::from_raw("2025-01-01")))
                .await
                .unwrap();
        }

        let vendors: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.vendor)
            .collect();
        assert_eq!(vendors, vec!["third", "second", "first"]);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_raw_date_stored_verbatim() {
        let store = MemoryStore::new();
        let stored = store
            .save(&record("A", InvoiceDate::from_raw("January 15, 2025")))
            .await
            .unwrap();
        assert_eq!(stored.invoice_date, "January 15, 2025");
    }
}
