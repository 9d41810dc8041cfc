//! Type normalization
//!
//! Coerces raw store text into the canonical [`Value`] for a column's
//! declared [`SemanticType`]. Anything that does not parse becomes
//! [`Value::Missing`] rather than an error, so one malformed cell never aborts
//! a table.

use crate::domain::{SemanticType, Value};
use chrono::NaiveDate;

/// Normalize a whole raw column
pub fn normalize_column(semantic_type: SemanticType, raw: Vec<Option<String>>) -> Vec<Value> {
    raw.into_iter()
        .map(|cell| normalize_value(semantic_type, cell))
        .collect()
}

/// Normalize one raw cell
pub fn normalize_value(semantic_type: SemanticType, raw: Option<String>) -> Value {
    let Some(raw) = raw else {
        return Value::Missing;
    };

    match semantic_type {
        SemanticType::Integer | SemanticType::Month => parse_integer(&raw),
        SemanticType::Year => parse_year(&raw),
        SemanticType::Float => parse_float(&raw),
        SemanticType::Date => parse_date(&raw),
        SemanticType::Category | SemanticType::Alphanumeric | SemanticType::String => {
            Value::Text(raw)
        }
    }
}

fn parse_integer(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Value::Int(v);
    }
    // Stores frequently render integral numbers as "12.0"
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            Value::Int(v as i64)
        }
        _ => Value::Missing,
    }
}

fn parse_year(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.len() != 4 {
        return Value::Missing;
    }
    match trimmed.parse::<i64>() {
        Ok(v) if v >= 0 => Value::Int(v),
        _ => Value::Missing,
    }
}

fn parse_float(raw: &str) -> Value {
    match raw.trim().parse::<f64>() {
        // + 0.0 folds -0.0 into 0.0 so both land in one class
        Ok(v) if v.is_finite() => Value::Float(v + 0.0),
        _ => Value::Missing,
    }
}

fn parse_date(raw: &str) -> Value {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map(Value::Date)
        .unwrap_or(Value::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(normalize_value(SemanticType::Integer, some("42")), Value::Int(42));
        assert_eq!(normalize_value(SemanticType::Integer, some(" -7 ")), Value::Int(-7));
        assert_eq!(normalize_value(SemanticType::Integer, some("12.0")), Value::Int(12));
        assert_eq!(normalize_value(SemanticType::Integer, some("12.5")), Value::Missing);
        assert_eq!(normalize_value(SemanticType::Integer, some("abc")), Value::Missing);
        assert_eq!(normalize_value(SemanticType::Integer, None), Value::Missing);
    }

    #[test]
    fn test_date_formats() {
        let expected = Value::Date(NaiveDate::from_ymd_opt(2019, 12, 31).unwrap());
        assert_eq!(normalize_value(SemanticType::Date, some("20191231")), expected);
        assert_eq!(normalize_value(SemanticType::Date, some("2019-12-31")), expected);
        assert_eq!(normalize_value(SemanticType::Date, some("20191332")), Value::Missing);
    }

    #[test]
    fn test_year() {
        assert_eq!(normalize_value(SemanticType::Year, some("1984")), Value::Int(1984));
        assert_eq!(normalize_value(SemanticType::Year, some("84")), Value::Missing);
    }

    #[test]
    fn test_float() {
        assert_eq!(normalize_value(SemanticType::Float, some("0.5")), Value::Float(0.5));
        assert_eq!(normalize_value(SemanticType::Float, some("-0.0")), Value::Float(0.0));
        assert_eq!(normalize_value(SemanticType::Float, some("NaN")), Value::Missing);
        assert_eq!(normalize_value(SemanticType::Float, some("inf")), Value::Missing);
    }

    #[test]
    fn test_text_types_pass_through() {
        assert_eq!(
            normalize_value(SemanticType::Category, some("L")),
            Value::Text("L".into())
        );
        assert_eq!(
            normalize_value(SemanticType::String, some("")),
            Value::Text(String::new())
        );
        assert_eq!(normalize_value(SemanticType::Alphanumeric, None), Value::Missing);
    }

    #[test]
    fn test_normalize_column_keeps_length() {
        let raw = vec![some("1"), None, some("x"), some("3")];
        let values = normalize_column(SemanticType::Integer, raw);
        assert_eq!(
            values,
            vec![Value::Int(1), Value::Missing, Value::Missing, Value::Int(3)]
        );
    }
}
