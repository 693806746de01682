//! Tagged attribute values and typed comparison.
//!
//! Map-layer attributes carry no fixed static type in the host, so values
//! are modeled as an explicit tagged union with defined coercion rules.
//! Comparisons between incompatible tags never raise; they simply yield no
//! ordering, which the evaluator turns into "no match".

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::NaiveDate;

/// A single attribute value as delivered by the host layer source.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Date(NaiveDate),
    Null,
}

impl AttributeValue {
    /// True for null, the empty string, or a whitespace-only string.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion: integers, reals, and numeric-looking text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Date coercion: dates, and ISO `YYYY-MM-DD` text.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Text(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    /// String coercion. `Null` is not string-coercible.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) => Some(Cow::Borrowed(text)),
            Self::Integer(value) => Some(Cow::Owned(value.to_string())),
            Self::Real(value) => Some(Cow::Owned(value.to_string())),
            Self::Boolean(value) => Some(Cow::Owned(value.to_string())),
            Self::Date(date) => Some(Cow::Owned(date.format("%Y-%m-%d").to_string())),
            Self::Null => None,
        }
    }
}

/// Ordered comparison for the numeric and date tags only.
///
/// Numeric coercion takes precedence over date coercion. Pairs that coerce
/// to neither yield `None`, which callers treat as no match — ordering
/// operators are not defined over free-form text.
pub fn ordered_compare(left: &AttributeValue, right: &AttributeValue) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        return a.partial_cmp(&b);
    }
    if let (Some(a), Some(b)) = (left.as_date(), right.as_date()) {
        return Some(a.cmp(&b));
    }
    None
}

/// Equality with full coercion precedence: numeric, then date, then
/// case-insensitive string. Incompatible pairs are not equal.
pub fn values_equal(left: &AttributeValue, right: &AttributeValue) -> bool {
    if let Some(ordering) = ordered_compare(left, right) {
        return ordering == Ordering::Equal;
    }
    match (left.as_text(), right.as_text()) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_coerces_for_comparison() {
        let stored = AttributeValue::Text("12".into());
        let operand = AttributeValue::Integer(12);
        assert!(values_equal(&stored, &operand));
        assert_eq!(
            ordered_compare(&AttributeValue::Text("3".into()), &AttributeValue::Real(2.5)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn incompatible_tags_never_compare() {
        let stored = AttributeValue::Boolean(true);
        let operand = AttributeValue::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(ordered_compare(&stored, &operand), None);
        assert!(!values_equal(&stored, &operand));
    }

    #[test]
    fn string_equality_is_case_insensitive() {
        let stored = AttributeValue::Text("Main St".into());
        let operand = AttributeValue::Text("main st".into());
        assert!(values_equal(&stored, &operand));
    }

    #[test]
    fn date_text_coerces() {
        let stored = AttributeValue::Text("2023-04-01".into());
        let operand = AttributeValue::Date(NaiveDate::from_ymd_opt(2023, 4, 2).unwrap());
        assert_eq!(ordered_compare(&stored, &operand), Some(Ordering::Less));
    }

    #[test]
    fn empty_detection() {
        assert!(AttributeValue::Null.is_empty());
        assert!(AttributeValue::Text("  ".into()).is_empty());
        assert!(!AttributeValue::Integer(0).is_empty());
    }
}
