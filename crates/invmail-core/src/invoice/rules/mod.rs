//! Rule-based field extractors for invoice emails.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod sender;
pub mod vendor;

pub use amounts::{parse_amount, TotalAmount, TotalExtractor};
pub use dates::DateExtractor;
pub use sender::{bare_address, SenderExtractor};
pub use vendor::VendorExtractor;

use std::fmt::Debug;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::invoice::{InvoiceDate, PartialInvoice};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, best first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value matched in the source text.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position of the value in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Log where the value came from and hand it over.
    fn into_logged(self, field: &str) -> T
    where
        T: Debug,
    {
        debug!(
            field,
            position = ?self.position,
            "Matched {:?} from {:?}",
            self.value,
            self.source
        );
        self.value
    }
}

/// Pattern-based recovery of invoice fields.
///
/// Used one field at a time to fill gaps in a remote result, or through
/// [`HeuristicMatcher::guess`] when the remote call failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMatcher;

impl HeuristicMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn vendor(&self, text: &str) -> Option<String> {
        VendorExtractor::new()
            .extract(text)
            .map(|m| m.into_logged("vendor"))
    }

    pub fn total(&self, text: &str) -> Option<Decimal> {
        self.labeled_total(text).map(|t| t.amount)
    }

    /// Currency next to the labeled total.
    pub fn currency(&self, text: &str) -> Option<String> {
        self.labeled_total(text).and_then(|t| t.currency)
    }

    pub fn invoice_date(&self, text: &str) -> Option<InvoiceDate> {
        DateExtractor::new()
            .extract(text)
            .map(|m| InvoiceDate::from_raw(&m.into_logged("invoice_date")))
    }

    pub fn sender_email(&self, text: &str) -> Option<String> {
        SenderExtractor::new()
            .extract(text)
            .map(|m| m.into_logged("sender_email"))
    }

    fn labeled_total(&self, text: &str) -> Option<TotalAmount> {
        TotalExtractor::new()
            .extract(text)
            .map(|m| m.into_logged("total"))
    }

    /// Every field the rules can recover from `text`.
    pub fn guess(&self, text: &str) -> PartialInvoice {
        let total = self.labeled_total(text);

        PartialInvoice {
            vendor: self.vendor(text),
            total: total.as_ref().map(|t| t.amount),
            currency: total.and_then(|t| t.currency),
            invoice_date: self.invoice_date(text),
            sender_email: self.sender_email(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_guess_full_text() {
        let text = "Vendor: ACME Corp\nTotal: $123.45\nDate: 2025-01-01\nFrom: billing@acme.com";

        let guess = HeuristicMatcher::new().guess(text);

        assert_eq!(
            guess,
            PartialInvoice {
                vendor: Some("ACME Corp".to_string()),
                total: Some(Decimal::from_str("123.45").unwrap()),
                currency: Some("USD".to_string()),
                invoice_date: Some(InvoiceDate::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())),
                sender_email: Some("billing@acme.com".to_string()),
            }
        );
    }

    #[test]
    fn test_guess_nothing() {
        let guess = HeuristicMatcher::new().guess("Hello, see you Tuesday.");
        assert_eq!(guess, PartialInvoice::default());
    }

    #[test]
    fn test_single_field_rules_match_guess() {
        let text = "Supplier: Globex\nAmount Due: 1,299.00 EUR\nInvoice Date: January 15, 2025";
        let matcher = HeuristicMatcher::new();
        let guess = matcher.guess(text);

        assert_eq!(guess.vendor, matcher.vendor(text));
        assert_eq!(guess.total, matcher.total(text));
        assert_eq!(guess.currency, matcher.currency(text));
        assert_eq!(guess.invoice_date, matcher.invoice_date(text));
        assert_eq!(
            guess.invoice_date,
            Some(InvoiceDate::Raw("January 15, 2025".to_string()))
        );
    }
}
