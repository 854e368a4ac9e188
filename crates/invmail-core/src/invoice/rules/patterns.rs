//! Common regex patterns for invoice email extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Vendor line labels, highest priority first.
pub const VENDOR_LABELS: &[&str] = &[
    "Vendor",
    "From",
    "Supplier",
    r"Billed\s*To",
    "Company",
    "Sender",
];

lazy_static! {
    // One pattern per vendor label, in VENDOR_LABELS order.
    // "<label>: <rest of line>", optionally quoted or bulleted.
    pub static ref VENDOR_LINES: Vec<Regex> = VENDOR_LABELS
        .iter()
        .map(|label| {
            Regex::new(&format!(
                r"(?im)^[ \t>*\-]*{}[ \t]*:[ \t]*(\S.*?)[ \t\r]*$",
                label
            ))
            .unwrap()
        })
        .collect();

    // Labeled total with an optional currency symbol before and code after.
    // The amount may sit on the line after the label ("Total:\n$249.99").
    // Thousands separators are kept in `amount` and stripped by the parser.
    pub static ref TOTAL: Regex = Regex::new(
        r"(?i)\b(?:Total\s+Amount\s+Due|Amount\s*Due|Total|Balance)\b[^\d\n]*?\s*(?P<symbol>[$€£])?[ \t]*(?P<amount>\d[\d,]*(?:\.\d{1,2})?)(?:[ \t]*(?P<code>USD|EUR|GBP|PLN|CAD|AUD|CHF|JPY)\b)?"
    ).unwrap();

    // ISO date after a date label, on the same or the next line:
    // "Invoice Date: 2025-01-20"
    pub static ref DATE_ISO: Regex = Regex::new(
        r"(?i)\b(?:Invoice\s*Date|Date)\b[^\d\n]*\s*(\d{4}-\d{2}-\d{2})"
    ).unwrap();

    // Long-form date after a date label: "Date: January 15, 2025"
    pub static ref DATE_LONG: Regex = Regex::new(
        r"(?i)\b(?:Invoice\s*Date|Date)\b[: \t]*([A-Za-z]+\s+\d{1,2},\s+\d{4})"
    ).unwrap();

    // Address on a From/Sender/Reply-To line
    pub static ref SENDER_LINE: Regex = Regex::new(
        r"(?im)^[ \t>*\-]*(?:From|Sender|Reply-To)[ \t]*:[^\n]*?([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})"
    ).unwrap();

    // Email pattern
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_lines_compile_in_order() {
        assert_eq!(VENDOR_LINES.len(), VENDOR_LABELS.len());
        assert!(VENDOR_LINES[3].is_match("Billed To: Contoso Ltd"));
        assert!(VENDOR_LINES[3].is_match("billedto: Contoso Ltd"));
    }

    #[test]
    fn test_total_ignores_subtotal() {
        let caps = TOTAL.captures("Subtotal: 100.00\nTax: 8.00\nTotal: 108.00").unwrap();
        assert_eq!(&caps["amount"], "108.00");

        let caps = TOTAL.captures("Subtotal:\n100.00\nTotal:\n$108.00").unwrap();
        assert_eq!(&caps["amount"], "108.00");
        assert_eq!(caps.name("symbol").map(|m| m.as_str()), Some("$"));
    }

    #[test]
    fn test_total_value_on_following_line() {
        let caps = TOTAL.captures("Total:\r\n  249.99 EUR").unwrap();
        assert_eq!(&caps["amount"], "249.99");
        assert_eq!(caps.name("code").map(|m| m.as_str()), Some("EUR"));

        // Only blank space may separate the label from the value.
        assert!(!TOTAL.is_match("Total:\nsee attachment\nRef 12"));
    }

    #[test]
    fn test_total_currency_parts() {
        let caps = TOTAL.captures("Total: €1,050.00").unwrap();
        assert_eq!(caps.name("symbol").map(|m| m.as_str()), Some("€"));
        assert_eq!(&caps["amount"], "1,050.00");

        let caps = TOTAL.captures("Amount Due 75.25 EUR").unwrap();
        assert_eq!(caps.name("code").map(|m| m.as_str()), Some("EUR"));
    }

    #[test]
    fn test_date_labels_do_not_match_inside_words() {
        assert!(!DATE_ISO.is_match("Updated 2025-01-01"));
        assert!(DATE_ISO.is_match("Invoice Date: 2025-01-01"));
    }

    #[test]
    fn test_iso_date_on_following_line() {
        let caps = DATE_ISO.captures("Invoice Date:\n2025-03-01").unwrap();
        assert_eq!(&caps[1], "2025-03-01");
    }
}
