//! Vendor name extraction from labeled lines.

use super::patterns::VENDOR_LINES;
use super::{ExtractionMatch, FieldExtractor};

/// Vendor extractor.
///
/// Labels are tried in priority order (`Vendor` before `From`, and so on);
/// within one label the first line wins.
pub struct VendorExtractor;

impl VendorExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VendorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for pattern in VENDOR_LINES.iter() {
            for caps in pattern.captures_iter(text) {
                let Some(value) = caps.get(1) else {
                    continue;
                };
                let name = value.as_str().trim();
                if name.is_empty() {
                    continue;
                }
                results.push(
                    ExtractionMatch::new(name.to_string(), &caps[0])
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

    fn vendor(text: &str) -> Option<String> {
        VendorExtractor::new().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_vendor_label() {
        assert_eq!(vendor("Vendor: ACME Corp\n"), Some("ACME Corp".to_string()));
        assert_eq!(vendor("  supplier :  Globex  \r\n"), Some("Globex".to_string()));
        assert_eq!(vendor("> Company: Initech"), Some("Initech".to_string()));
    }

    #[test]
    fn test_label_priority() {
        let text = "From: billing@acme.com\nVendor: ACME Corp\n";
        assert_eq!(vendor(text), Some("ACME Corp".to_string()));

        let text = "Sender: Ops Team\nBilled To: Wayne Enterprises\n";
        assert_eq!(vendor(text), Some("Wayne Enterprises".to_string()));
    }

    #[test]
    fn test_label_requires_colon_and_value() {
        assert_eq!(vendor("Vendor ACME Corp"), None);
        assert_eq!(vendor("Vendor:\nTotal: 5.00"), None);
        assert_eq!(vendor("Our vendor: ACME"), None);
    }
}
