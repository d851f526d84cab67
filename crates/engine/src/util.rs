//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing of stored values so every entity maps rows the same way.

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| EngineError::InvalidArgument(format!("invalid {label} id: {value}")))
}

/// Parse a decimal stored as text. Amounts never go through `f64`.
pub(crate) fn parse_decimal(value: &str, label: &str) -> ResultEngine<Decimal> {
    Decimal::from_str(value)
        .map_err(|_| EngineError::InvalidArgument(format!("invalid {label}: {value}")))
}

/// Trim an optional text, mapping blank strings to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn decimal_round_trips_scale() {
        assert_eq!(parse_decimal("100.50", "balance").unwrap(), dec!(100.50));
        assert_eq!(
            parse_decimal("100.50", "balance").unwrap().to_string(),
            "100.50"
        );
    }

    #[test]
    fn bad_decimal_is_invalid_argument() {
        let err = parse_decimal("12,5x", "balance").unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn blank_text_is_none() {
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(
            normalize_optional_text(Some("  rent ")),
            Some("rent".to_string())
        );
        assert_eq!(normalize_optional_text(None), None);
    }
}
