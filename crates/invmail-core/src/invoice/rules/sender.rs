//! Sender address extraction from header-like lines in the body.

use super::patterns::{EMAIL, SENDER_LINE};
use super::{ExtractionMatch, FieldExtractor};

/// Sender address extractor.
pub struct SenderExtractor;

impl SenderExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SenderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for SenderExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        SENDER_LINE
            .captures_iter(text)
            .filter_map(|caps| {
                let address = caps.get(1)?;
                Some(
                    ExtractionMatch::new(address.as_str().to_string(), &caps[0])
                        .with_position(address.start(), address.end()),
                )
            })
            .collect()
    }
}

/// Bare address from a value like `"Billing <billing@acme.com>"`.
///
/// Values without an address are returned trimmed.
pub fn bare_address(value: &str) -> String {
    EMAIL
        .find(value)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(text: &str) -> Option<String> {
        SenderExtractor::new().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_from_line() {
        assert_eq!(
            sender("Vendor: ACME\nFrom: billing@acme.com"),
            Some("billing@acme.com".to_string())
        );
        assert_eq!(
            sender("reply-to: \"AP\" <ap@globex.example>"),
            Some("ap@globex.example".to_string())
        );
    }

    #[test]
    fn test_from_line_without_address() {
        assert_eq!(sender("From: ACME Corp"), None);
        assert_eq!(sender("Contact billing@acme.com"), None);
    }

    #[test]
    fn test_bare_address() {
        assert_eq!(bare_address("Billing <billing@acme.com>"), "billing@acme.com");
        assert_eq!(bare_address("  Accounts  "), "Accounts");
    }
}
