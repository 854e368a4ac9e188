//! Invoice date extraction.
//!
//! Matched text is returned as written. Long-form dates such as
//! "January 15, 2025" are not converted to ISO form.

use super::patterns::{DATE_ISO, DATE_LONG};
use super::{ExtractionMatch, FieldExtractor};

/// Labeled invoice date extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// ISO matches first, then long-form matches, each in text order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for pattern in [&*DATE_ISO, &*DATE_LONG] {
            for caps in pattern.captures_iter(text) {
                let Some(value) = caps.get(1) else {
                    continue;
                };
                results.push(
                    ExtractionMatch::new(value.as_str().trim().to_string(), &caps[0])
                        .with_position(value.start(), value.end()),
                );
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> Option<String> {
        DateExtractor::new().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(date("Date: 2025-01-01"), Some("2025-01-01".to_string()));
        assert_eq!(
            date("Invoice Date - 2024-12-31\nTotal: 5"),
            Some("2024-12-31".to_string())
        );
    }

    #[test]
    fn test_long_form_kept_raw() {
        assert_eq!(
            date("Invoice Date: January 15, 2025"),
            Some("January 15, 2025".to_string())
        );
    }

    #[test]
    fn test_iso_preferred_over_long_form() {
        let text = "Date: March 3, 2025\nInvoice Date: 2025-03-04";
        assert_eq!(date(text), Some("2025-03-04".to_string()));
    }

    #[test]
    fn test_no_label() {
        assert_eq!(date("Paid on 2025-01-01"), None);
        assert_eq!(date("Total: 10.00"), None);
    }
}
