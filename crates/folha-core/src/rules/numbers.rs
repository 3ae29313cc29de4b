//! Numeric token parsing for the Brazilian convention ("1.234,56").

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use crate::error::ExtractionError;
use crate::models::NumberPolicy;

/// Parse a token, returning `None` when it is empty or malformed.
///
/// Dots are thousands separators and are dropped; the comma is the decimal
/// separator. The input convention is fixed: "12.5" reads as 125.
pub fn try_parse_number(token: &str) -> Option<Decimal> {
    let cleaned = token.trim().replace('.', "").replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parse a token, substituting zero when it does not parse.
pub fn parse_number(token: &str) -> Decimal {
    try_parse_number(token).unwrap_or(Decimal::ZERO)
}

/// Parse a token for `field` under the given policy.
///
/// With [`NumberPolicy::ZeroFill`] an unparsed token becomes zero and a
/// warning is pushed; with [`NumberPolicy::Strict`] it is an error.
pub fn resolve_number(
    token: &str,
    field: &str,
    policy: NumberPolicy,
    warnings: &mut Vec<String>,
) -> Result<Decimal, ExtractionError> {
    match try_parse_number(token) {
        Some(value) => Ok(value),
        None => match policy {
            NumberPolicy::ZeroFill => {
                warn!(field, token, "Unparsed number replaced with zero");
                warnings.push(format!("{field}: unparsed number {token:?} replaced with 0"));
                Ok(Decimal::ZERO)
            }
            NumberPolicy::Strict => Err(ExtractionError::Parse {
                field: field.to_string(),
                value: token.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1.234,56"), dec("1234.56"));
        assert_eq!(parse_number(""), Decimal::ZERO);
        assert_eq!(parse_number("12,5"), dec("12.5"));
        assert_eq!(parse_number("183"), dec("183"));
        assert_eq!(parse_number("1.000.000,01"), dec("1000000.01"));
        assert_eq!(parse_number("abc"), Decimal::ZERO);
    }

    #[test]
    fn test_dot_decimal_is_not_auto_detected() {
        assert_eq!(parse_number("12.5"), dec("125"));
    }

    #[test]
    fn test_try_parse_distinguishes_unparsed() {
        assert_eq!(try_parse_number("0,00"), Some(Decimal::ZERO));
        assert_eq!(try_parse_number(""), None);
        assert_eq!(try_parse_number("  "), None);
        assert_eq!(try_parse_number("8,O0"), None);
    }

    #[test]
    fn test_resolve_number_policies() {
        let mut warnings = Vec::new();
        let value = resolve_number("x,5", "atn", NumberPolicy::ZeroFill, &mut warnings).unwrap();
        assert_eq!(value, Decimal::ZERO);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("atn"));

        let err = resolve_number("x,5", "atn", NumberPolicy::Strict, &mut warnings).unwrap_err();
        match err {
            ExtractionError::Parse { field, value } => {
                assert_eq!(field, "atn");
                assert_eq!(value, "x,5");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let value = resolve_number("7,25", "atn", NumberPolicy::Strict, &mut warnings).unwrap();
        assert_eq!(value, dec("7.25"));
    }
}
