//! Numeric coercion of raw metric cells.
//!
//! Values keep their source units: a `%` sign is stripped, never divided
//! out, so `"33.5%"` parses to `33.5`.

use chr_model::MetricValue;
use thiserror::Error;

/// Case-insensitive placeholders that mean "no value".
pub const MISSING_TOKENS: [&str; 5] = ["n/a", "na", "null", "none", "nan"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("empty value")]
    Empty,
    #[error("missing-value token '{0}'")]
    MissingToken(String),
    #[error("not a number: '{0}'")]
    Invalid(String),
    #[error("value out of range: '{0}'")]
    NonFinite(String),
}

impl NumericError {
    /// Blank cells and placeholder tokens are expected; they are not counted
    /// as parse failures.
    pub fn is_missing(&self) -> bool {
        matches!(self, NumericError::Empty | NumericError::MissingToken(_))
    }
}

/// Parse a raw cell to a finite `f64`.
///
/// Handles common spellings:
/// - Thousands separators: "1,234,567"
/// - Percent and currency signs: "33.5%", "$52,000"
/// - Ordinary and non-breaking spaces: "12 345"
pub fn parse_numeric(raw: &str) -> Result<f64, NumericError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(NumericError::Empty);
    }
    if MISSING_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return Err(NumericError::MissingToken(trimmed.to_string()));
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '%' | '$' | ' ' | '\u{a0}'))
        .collect();

    let value: f64 = cleaned
        .parse()
        .map_err(|_| NumericError::Invalid(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(NumericError::NonFinite(trimmed.to_string()));
    }
    Ok(value)
}

/// Parse a raw cell into a [`MetricValue`].
///
/// The error is returned alongside `Missing` so callers can count
/// unparseable cells without failing the row.
pub fn parse_metric_value(raw: &str) -> (MetricValue, Option<NumericError>) {
    match parse_numeric(raw) {
        Ok(value) => (MetricValue::Value(value), None),
        Err(error) => (MetricValue::Missing, Some(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_simple_values() {
        assert_eq!(parse_numeric("123"), Ok(123.0));
        assert_eq!(parse_numeric("-0.5"), Ok(-0.5));
        assert_eq!(parse_numeric("  75.4 "), Ok(75.4));
        assert_eq!(parse_numeric("1.23e5"), Ok(123000.0));
    }

    #[test]
    fn test_cleanup_keeps_units() {
        assert_eq!(parse_numeric("12,345.6%"), Ok(12345.6));
        assert_eq!(parse_numeric("$52,000"), Ok(52000.0));
        assert_eq!(parse_numeric("12\u{a0}345"), Ok(12345.0));
        assert_eq!(parse_numeric("33.5%"), Ok(33.5));
    }

    #[test]
    fn test_missing_tokens() {
        assert_eq!(parse_numeric(""), Err(NumericError::Empty));
        assert_eq!(parse_numeric("   "), Err(NumericError::Empty));
        for token in ["N/A", "na", "NULL", "None", "NaN"] {
            let err = parse_numeric(token).unwrap_err();
            assert!(err.is_missing(), "{token} should be a missing token");
        }
    }

    #[test]
    fn test_invalid_and_non_finite() {
        assert_eq!(
            parse_numeric("abc"),
            Err(NumericError::Invalid("abc".to_string()))
        );
        assert!(matches!(parse_numeric("%"), Err(NumericError::Invalid(_))));
        assert!(matches!(parse_numeric("inf"), Err(NumericError::NonFinite(_))));
        assert!(matches!(parse_numeric("1e400"), Err(NumericError::NonFinite(_))));
        assert!(!NumericError::Invalid("x".into()).is_missing());
    }

    #[test]
    fn test_parse_metric_value() {
        assert_eq!(parse_metric_value("75.4"), (MetricValue::Value(75.4), None));
        let (value, error) = parse_metric_value("n/a");
        assert_eq!(value, MetricValue::Missing);
        assert!(error.is_some_and(|e| e.is_missing()));
        let (value, error) = parse_metric_value("suppressed");
        assert_eq!(value, MetricValue::Missing);
        assert!(matches!(error, Some(NumericError::Invalid(_))));
    }

    proptest! {
        #[test]
        fn parsed_values_are_finite(raw in "\\PC{0,12}") {
            if let Ok(value) = parse_numeric(&raw) {
                prop_assert!(value.is_finite());
            }
        }

        #[test]
        fn missing_tokens_never_parse_as_zero(
            token in prop::sample::select(MISSING_TOKENS.to_vec()),
            upper in any::<bool>(),
        ) {
            let token = if upper { token.to_ascii_uppercase() } else { token.to_string() };
            let (value, _) = parse_metric_value(&token);
            prop_assert_eq!(value, MetricValue::Missing);
        }
    }
}
