//! Value parsers: pure functions turning an element's raw text + attributes
//! into a typed [`Value`], or `None` when the text is blank or `"-"`.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A parsed fact value. Deliberately small and `Clone`-cheap; rows hold one
/// of these per populated column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Decimal(BigDecimal),
    Date(NaiveDate),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Which parser a candidate uses. Parsers are pure: `(raw text, sign attr,
/// scale attr) -> Option<Value>`; the pre-parse null gate (empty, blank, or
/// `"-"` text) is applied by the caller before any parser runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parser {
    String,
    Decimal,
    DecimalWithColon,
    Date,
    Bool,
    ReversedBool,
}

impl Parser {
    /// Returns `None` if `text` is blank after trimming, or is the single
    /// character `-`, without ever invoking the underlying parser.
    pub fn parse(self, text: &str, sign_attr: Option<&str>, scale_attr: Option<&str>) -> Option<Value> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "-" {
            return None;
        }

        match self {
            Parser::String => Some(Value::Str(clean_string(trimmed))),
            Parser::Decimal => parse_decimal(trimmed, sign_attr, scale_attr).map(Value::Decimal),
            Parser::DecimalWithColon => {
                let after_colon = strip_through_rightmost_colon_space(trimmed);
                parse_decimal(after_colon, sign_attr, scale_attr).map(Value::Decimal)
            }
            Parser::Date => parse_permissive_date(trimmed).map(Value::Date),
            Parser::Bool => match trimmed {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            Parser::ReversedBool => match trimmed {
                "true" => Some(Value::Bool(false)),
                "false" => Some(Value::Bool(true)),
                _ => None,
            },
        }
    }
}

fn clean_string(text: &str) -> String {
    text.replace(['\n', '\r'], " ").replace('"', "")
}

/// `sign` attr `-` negates; `scale` attr (default 0) is a power-of-ten
/// multiplier; commas are stripped before parsing so "1,234" reads as 1234.
fn parse_decimal(text: &str, sign_attr: Option<&str>, scale_attr: Option<&str>) -> Option<BigDecimal> {
    let negative = sign_attr == Some("-");
    let scale: i32 = scale_attr.and_then(|s| s.parse().ok()).unwrap_or(0);
    let without_commas: String = text.chars().filter(|c| *c != ',').collect();
    let mut value = BigDecimal::from_str(without_commas.trim()).ok()?;

    if negative {
        value = -value;
    }
    if scale != 0 {
        value *= ten_to_the(scale);
    }
    Some(value)
}

/// `10^scale` as an exact decimal, built from scientific notation so it
/// works for negative scales too.
fn ten_to_the(scale: i32) -> BigDecimal {
    BigDecimal::from_str(&format!("1e{scale}")).expect("scientific notation literal always parses")
}

/// Strips everything through the rightmost `": "`, leaving the remainder for
/// `Decimal` to parse. E.g. `"Average number of employees: 0.02"` → `"0.02"`.
fn strip_through_rightmost_colon_space(text: &str) -> &str {
    match text.rfind(": ") {
        Some(idx) => &text[idx + 2..],
        None => text,
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%Y%m%d"];

/// Permissive calendar-date parse: ISO 8601 plus a handful of common
/// variants seen in Companies House filings and in filenames.
pub fn parse_permissive_date(text: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_dash_are_null() {
        assert_eq!(Parser::Decimal.parse("", None, None), None);
        assert_eq!(Parser::Decimal.parse("   ", None, None), None);
        assert_eq!(Parser::Decimal.parse("-", None, None), None);
    }

    #[test]
    fn decimal_applies_sign_and_scale_exactly() {
        let value = Parser::Decimal.parse("1,234", Some("-"), Some("3")).unwrap();
        assert_eq!(value, Value::Decimal(BigDecimal::from_str("-1234000").unwrap()));
    }

    #[test]
    fn decimal_default_sign_and_scale() {
        let value = Parser::Decimal.parse("214222", None, None).unwrap();
        assert_eq!(value, Value::Decimal(BigDecimal::from_str("214222").unwrap()));
    }

    #[test]
    fn decimal_with_colon_strips_rightmost_prefix() {
        let value = Parser::DecimalWithColon
            .parse("Average number of employees during the period: 0.02", None, None)
            .unwrap();
        assert_eq!(value, Value::Decimal(BigDecimal::from_str("0.02").unwrap()));
    }

    #[test]
    fn string_parser_strips_quotes_and_newlines() {
        let value = Parser::String.parse("Line one\nLine \"two\"", None, None).unwrap();
        assert_eq!(value, Value::Str("Line one Line two".to_string()));
    }

    #[test]
    fn bool_and_reversed_bool() {
        assert_eq!(Parser::Bool.parse("true", None, None), Some(Value::Bool(true)));
        assert_eq!(Parser::Bool.parse("false", None, None), Some(Value::Bool(false)));
        assert_eq!(Parser::Bool.parse("maybe", None, None), None);
        assert_eq!(Parser::ReversedBool.parse("true", None, None), Some(Value::Bool(false)));
        assert_eq!(Parser::ReversedBool.parse("false", None, None), Some(Value::Bool(true)));
    }

    #[test]
    fn date_parses_iso_8601() {
        assert_eq!(
            Parser::Date.parse("2022-12-31", None, None),
            Some(Value::Date(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap()))
        );
    }

    #[test]
    fn decimal_roundtrip_preserves_exact_value() {
        let original = BigDecimal::from_str("-1234000").unwrap();
        let rendered = original.to_string();
        let reparsed = BigDecimal::from_str(&rendered).unwrap();
        assert_eq!(original, reparsed);
    }
}
