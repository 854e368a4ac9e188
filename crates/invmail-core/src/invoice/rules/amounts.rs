//! Total amount and currency extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::TOTAL;
use super::{ExtractionMatch, FieldExtractor};

/// A labeled total found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalAmount {
    pub amount: Decimal,
    /// Currency code inferred from a symbol or code next to the amount.
    pub currency: Option<String>,
}

/// Labeled total extractor.
pub struct TotalExtractor;

impl TotalExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TotalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TotalExtractor {
    type Output = ExtractionMatch<TotalAmount>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in TOTAL.captures_iter(text) {
            let (Some(full_match), Some(digits)) = (caps.get(0), caps.name("amount")) else {
                continue;
            };
            let Some(amount) = parse_amount(digits.as_str()) else {
                continue;
            };

            let currency = caps
                .name("code")
                .map(|m| m.as_str().to_uppercase())
                .or_else(|| {
                    caps.name("symbol")
                        .and_then(|m| symbol_to_code(m.as_str()))
                        .map(str::to_string)
                });

            results.push(
                ExtractionMatch::new(TotalAmount { amount, currency }, full_match.as_str())
                    .with_position(digits.start(), digits.end()),
            );
        }

        results
    }
}

/// Parse an amount with optional thousands separators ("1,299.00").
///
/// Returns `None` rather than zero when the text is not a number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

fn symbol_to_code(symbol: &str) -> Option<&'static str> {
    match symbol {
        "$" => Some("USD"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("249.99"), Some(dec("249.99")));
        assert_eq!(parse_amount("1,299.00"), Some(dec("1299.00")));
        assert_eq!(parse_amount("12,345,678.90"), Some(dec("12345678.90")));
        assert_eq!(parse_amount("1,"), Some(dec("1")));
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount("12.3.4"), None);
    }

    #[test]
    fn test_dollar_total() {
        let total = TotalExtractor::new().extract("Total: $249.99").unwrap();
        assert_eq!(total.value.amount, dec("249.99"));
        assert_eq!(total.value.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_total_amount_due_with_separator() {
        let total = TotalExtractor::new()
            .extract("Total Amount Due: 1,299.00")
            .unwrap();
        assert_eq!(total.value.amount, dec("1299.00"));
        assert_eq!(total.value.currency, None);
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let extractor = TotalExtractor::new();
        assert_eq!(
            extractor.extract("BALANCE due: 42.10 gbp").unwrap().value,
            TotalAmount { amount: dec("42.10"), currency: Some("GBP".to_string()) }
        );
        assert_eq!(
            extractor.extract("amount due 7").unwrap().value.amount,
            dec("7")
        );
    }

    #[test]
    fn test_match_points_at_amount() {
        let text = "Invoice 7\nTotal: $249.99 due now";
        let total = TotalExtractor::new().extract(text).unwrap();

        assert_eq!(total.source, "Total: $249.99");
        let (start, end) = total.position.unwrap();
        assert_eq!(&text[start..end], "249.99");
    }

    #[test]
    fn test_amount_on_next_line() {
        let total = TotalExtractor::new().extract("Total:\n$249.99").unwrap();
        assert_eq!(total.value.amount, dec("249.99"));
        assert_eq!(total.value.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_unlabeled_amount_not_matched() {
        assert!(TotalExtractor::new().extract("We charged 99.00 yesterday").is_none());
    }

    #[test]
    fn test_extract_all_in_text_order() {
        let text = "Subtotal: 10.00\nTotal: 12.00\nBalance: 0.00";
        let amounts: Vec<Decimal> = TotalExtractor::new()
            .extract_all(text)
            .into_iter()
            .map(|m| m.value.amount)
            .collect();
        assert_eq!(amounts, vec![dec("12.00"), dec("0.00")]);
    }
}
