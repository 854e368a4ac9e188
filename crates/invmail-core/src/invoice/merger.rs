//! Combining remote, heuristic and default values into a complete record.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::RemoteFailure;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{InvoiceDate, InvoiceRecord, PartialInvoice};

use super::rules::{bare_address, HeuristicMatcher};

/// Source of the processing date used as the default invoice date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stopped on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Values used for fields no source could provide.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefaults {
    pub vendor: String,
    pub currency: String,
    pub sender_email: String,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for FieldDefaults {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            vendor: config.default_vendor.clone(),
            currency: config.default_currency.clone(),
            sender_email: config.default_sender_email.clone(),
        }
    }
}

/// Applies field precedence: remote, then text rules, then the known
/// sender, then defaults.
#[derive(Debug, Clone, Default)]
pub struct FieldMerger {
    defaults: FieldDefaults,
    matcher: HeuristicMatcher,
}

impl FieldMerger {
    pub fn new(defaults: FieldDefaults) -> Self {
        Self {
            defaults,
            matcher: HeuristicMatcher::new(),
        }
    }

    pub fn defaults(&self) -> &FieldDefaults {
        &self.defaults
    }

    /// Build the final record for one document.
    ///
    /// A remote failure switches to the full heuristic guess. A remote success
    /// only has its absent vendor, total, date and sender filled from `text`.
    pub fn merge(
        &self,
        outcome: Result<PartialInvoice, RemoteFailure>,
        text: &str,
        known_sender: Option<&str>,
        today: NaiveDate,
    ) -> InvoiceRecord {
        let mut partial = match outcome {
            Ok(partial) => self.fill_gaps(partial, text),
            Err(failure) => {
                info!("No remote fields ({}), using text rules", failure.reason());
                self.matcher.guess(text)
            }
        };

        if partial.sender_email.is_none() {
            partial.sender_email = known_sender
                .map(bare_address)
                .filter(|s| !s.is_empty());
        }

        let missing = partial.missing_fields();
        if !missing.is_empty() {
            debug!("Applying defaults for {:?}", missing);
        }

        InvoiceRecord {
            vendor: partial.vendor.unwrap_or_else(|| self.defaults.vendor.clone()),
            total: partial.total.unwrap_or(Decimal::ZERO),
            currency: partial
                .currency
                .unwrap_or_else(|| self.defaults.currency.clone()),
            invoice_date: partial.invoice_date.unwrap_or(InvoiceDate::Date(today)),
            sender_email: partial
                .sender_email
                .unwrap_or_else(|| self.defaults.sender_email.clone()),
        }
    }

    fn fill_gaps(&self, mut partial: PartialInvoice, text: &str) -> PartialInvoice {
        if partial.vendor.is_none() {
            partial.vendor = self.matcher.vendor(text);
        }
        if partial.total.is_none() {
            partial.total = self.matcher.total(text);
        }
        if partial.invoice_date.is_none() {
            partial.invoice_date = self.matcher.invoice_date(text);
        }
        if partial.sender_email.is_none() {
            partial.sender_email = self.matcher.sender_email(text);
        }
        partial
    }
}
