//! Invoice data models.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vendor used when none could be recovered.
pub const DEFAULT_VENDOR: &str = "Unknown Vendor";

/// Currency used when none could be recovered.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Sender used when none could be recovered.
pub const DEFAULT_SENDER_EMAIL: &str = "unknown@email.com";

/// Invoice date as extracted.
///
/// Strings in `YYYY-MM-DD` form are held as dates; anything else (for example
/// a long-form date matched in the text) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceDate {
    /// A calendar date.
    Date(NaiveDate),
    /// Date text that is not in ISO form.
    Raw(String),
}

impl InvoiceDate {
    /// Classify a date string.
    pub fn from_raw(s: &str) -> Self {
        let trimmed = s.trim();
        match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(date) => InvoiceDate::Date(date),
            Err(_) => InvoiceDate::Raw(trimmed.to_string()),
        }
    }

    /// String form used for storage: ISO for dates, raw text otherwise.
    pub fn to_iso_string(&self) -> String {
        match self {
            InvoiceDate::Date(date) => date.format("%Y-%m-%d").to_string(),
            InvoiceDate::Raw(raw) => raw.clone(),
        }
    }

    /// The calendar date, if known.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            InvoiceDate::Date(date) => Some(*date),
            InvoiceDate::Raw(_) => None,
        }
    }
}

impl From<NaiveDate> for InvoiceDate {
    fn from(date: NaiveDate) -> Self {
        InvoiceDate::Date(date)
    }
}

impl From<String> for InvoiceDate {
    fn from(s: String) -> Self {
        InvoiceDate::from_raw(&s)
    }
}

impl From<&str> for InvoiceDate {
    fn from(s: &str) -> Self {
        InvoiceDate::from_raw(s)
    }
}

impl From<InvoiceDate> for String {
    fn from(date: InvoiceDate) -> Self {
        date.to_iso_string()
    }
}

impl fmt::Display for InvoiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

/// A fully populated invoice extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Supplier name.
    pub vendor: String,

    /// Total amount due.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Three-letter currency code.
    pub currency: String,

    /// Invoice date.
    pub invoice_date: InvoiceDate,

    /// Address of the sender.
    pub sender_email: String,
}

/// Invoice fields as returned by an extractor; any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialInvoice {
    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub invoice_date: Option<InvoiceDate>,

    #[serde(default)]
    pub sender_email: Option<String>,
}

impl PartialInvoice {
    /// Treat blank strings as absent and trim the rest.
    pub fn normalized(self) -> Self {
        Self {
            vendor: non_blank(self.vendor),
            total: self.total,
            currency: non_blank(self.currency),
            invoice_date: self.invoice_date.filter(|d| match d {
                InvoiceDate::Date(_) => true,
                InvoiceDate::Raw(raw) => !raw.trim().is_empty(),
            }),
            sender_email: non_blank(self.sender_email),
        }
    }

    /// Names of the fields that are still absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.vendor.is_none() {
            missing.push("vendor");
        }
        if self.total.is_none() {
            missing.push("total");
        }
        if self.currency.is_none() {
            missing.push("currency");
        }
        if self.invoice_date.is_none() {
            missing.push("invoice_date");
        }
        if self.sender_email.is_none() {
            missing.push("sender_email");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl From<InvoiceRecord> for PartialInvoice {
    fn from(record: InvoiceRecord) -> Self {
        Self {
            vendor: Some(record.vendor),
            total: Some(record.total),
            currency: Some(record.currency),
            invoice_date: Some(record.invoice_date),
            sender_email: Some(record.sender_email),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// An invoice as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInvoice {
    pub vendor: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    pub currency: String,

    /// Always stored as text.
    pub invoice_date: String,

    pub sender_email: String,

    /// Assigned by the store on insert.
    pub created_at: DateTime<Utc>,
}

/// Row sent to the store on insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInvoiceRow {
    pub vendor: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    pub currency: String,

    pub invoice_date: String,

    pub sender_email: String,
}

impl From<&InvoiceRecord> for NewInvoiceRow {
    fn from(record: &InvoiceRecord) -> Self {
        Self {
            vendor: record.vendor.clone(),
            total: record.total,
            currency: record.currency.clone(),
            invoice_date: record.invoice_date.to_iso_string(),
            sender_email: record.sender_email.clone(),
        }
    }
}

impl NewInvoiceRow {
    /// Attach the creation timestamp assigned by the store.
    pub fn into_stored(self, created_at: DateTime<Utc>) -> StoredInvoice {
        StoredInvoice {
            vendor: self.vendor,
            total: self.total,
            currency: self.currency,
            invoice_date: self.invoice_date,
            sender_email: self.sender_email,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_invoice_date_classification() {
        assert_eq!(
            InvoiceDate::from_raw("2025-01-01"),
            InvoiceDate::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        );
        assert_eq!(
            InvoiceDate::from_raw(" January 15, 2025 "),
            InvoiceDate::Raw("January 15, 2025".to_string())
        );
        assert_eq!(InvoiceDate::from_raw("2025-13-40").as_date(), None);
    }

    #[test]
    fn test_invoice_date_serializes_as_string() {
        let date = InvoiceDate::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-03-09\"");

        let raw = InvoiceDate::Raw("March 9, 2024".to_string());
        assert_eq!(serde_json::to_string(&raw).unwrap(), "\"March 9, 2024\"");
    }

    #[test]
    fn test_partial_from_model_json() {
        let json = r#"{
            "vendor": "  ",
            "total": 249.99,
            "currency": "eur ",
            "invoice_date": "2025-02-03",
            "sender_email": null
        }"#;

        let partial: PartialInvoice = serde_json::from_str(json).unwrap();
        let partial = partial.normalized();

        assert_eq!(partial.vendor, None);
        assert_eq!(partial.total, Some(Decimal::from_str("249.99").unwrap()));
        assert_eq!(partial.currency.as_deref(), Some("eur"));
        assert_eq!(
            partial.invoice_date,
            Some(InvoiceDate::Date(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()))
        );
        assert_eq!(partial.missing_fields(), vec!["vendor", "sender_email"]);
    }

    #[test]
    fn test_partial_missing_keys() {
        let partial: PartialInvoice = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, PartialInvoice::default());
        assert!(!partial.is_complete());
    }

    #[test]
    fn test_record_json_shape() {
        let record = InvoiceRecord {
            vendor: "ACME Corp".to_string(),
            total: Decimal::from_str("123.45").unwrap(),
            currency: "USD".to_string(),
            invoice_date: InvoiceDate::from_raw("2025-01-01"),
            sender_email: "billing@acme.com".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["total"], serde_json::json!(123.45));
        assert_eq!(value["invoice_date"], "2025-01-01");
    }
}
