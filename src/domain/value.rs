//! Cell values and the semantic column types they are normalized into
//!
//! A [`Value`] is the canonical representation of one cell after type
//! normalization. Values of one column always share a variant (plus
//! [`Value::Missing`]), which is what the generalization policies rely on.

use crate::domain::errors::PufError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Semantic type declared for a generalizable column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Integer,
    Float,
    Date,
    Year,
    Month,
    Category,
    Alphanumeric,
    String,
}

impl SemanticType {
    /// Types generalized by merging into the nearest present value
    pub fn is_numeric_like(self) -> bool {
        matches!(
            self,
            SemanticType::Integer
                | SemanticType::Float
                | SemanticType::Date
                | SemanticType::Year
                | SemanticType::Month
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Date => "date",
            SemanticType::Year => "year",
            SemanticType::Month => "month",
            SemanticType::Category => "category",
            SemanticType::Alphanumeric => "alphanumeric",
            SemanticType::String => "string",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = PufError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "integer" | "int" => Ok(SemanticType::Integer),
            "float" => Ok(SemanticType::Float),
            "date" => Ok(SemanticType::Date),
            "year" => Ok(SemanticType::Year),
            "month" => Ok(SemanticType::Month),
            "category" => Ok(SemanticType::Category),
            "alphanumeric" => Ok(SemanticType::Alphanumeric),
            "string" => Ok(SemanticType::String),
            other => Err(PufError::UnsupportedType(format!(
                "Data type '{other}' is not supported"
            ))),
        }
    }
}

/// Role a column plays in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    /// Normalized, shuffled and k-anonymized
    #[default]
    Generalizable,
    /// Replaced by pseudonyms drawn from an identifier pool
    Identifier,
    /// Invariant across rows, broadcast to the table's row count
    Constant,
}

/// One normalized cell
#[derive(Debug, Clone)]
pub enum Value {
    Missing,
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Render the value as an accumulator field; missing renders empty
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Missing => 0,
            Value::Int(_) => 1,
            Value::Float(_) => 2,
            Value::Date(_) => 3,
            Value::Text(_) => 4,
        }
    }

    /// Whether `self` is at least as close to `lower` as to `upper`.
    ///
    /// Values of different variants never compete; the lower candidate wins.
    pub fn nearer_to_lower(&self, lower: &Value, upper: &Value) -> bool {
        match (self, lower, upper) {
            (Value::Int(c), Value::Int(l), Value::Int(u)) => {
                (*c as i128 - *l as i128) <= (*u as i128 - *c as i128)
            }
            (Value::Float(c), Value::Float(l), Value::Float(u)) => (c - l) <= (u - c),
            (Value::Date(c), Value::Date(l), Value::Date(u)) => {
                (*c - *l).num_days() <= (*u - *c).num_days()
            }
            _ => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Missing => {}
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Date(v) => v.hash(state),
            Value::Text(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_type_parse() {
        assert_eq!("integer".parse::<SemanticType>().unwrap(), SemanticType::Integer);
        assert_eq!("Category".parse::<SemanticType>().unwrap(), SemanticType::Category);
        assert_eq!(" month ".parse::<SemanticType>().unwrap(), SemanticType::Month);
    }

    #[test]
    fn test_semantic_type_unsupported() {
        let err = "pseudo".parse::<SemanticType>().unwrap_err();
        assert!(matches!(err, PufError::UnsupportedType(_)));
        assert!(err.to_string().contains("pseudo"));
    }

    #[test]
    fn test_numeric_like() {
        assert!(SemanticType::Year.is_numeric_like());
        assert!(SemanticType::Date.is_numeric_like());
        assert!(!SemanticType::Category.is_numeric_like());
        assert!(!SemanticType::String.is_numeric_like());
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Missing < Value::Int(-5));
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::Float(-0.5) < Value::Float(0.25));
        assert_eq!(Value::Text("a".into()), Value::from("a"));
    }

    #[test]
    fn test_value_render() {
        assert_eq!(Value::Missing.render(), "");
        assert_eq!(Value::Int(42).render(), "42");
        assert_eq!(Value::Float(1.5).render(), "1.5");
        let date = NaiveDate::from_ymd_opt(2019, 3, 7).unwrap();
        assert_eq!(Value::Date(date).render(), "2019-03-07");
    }

    #[test]
    fn test_nearer_to_lower_ties_prefer_lower() {
        let cur = Value::Int(20);
        assert!(cur.nearer_to_lower(&Value::Int(10), &Value::Int(30)));
        assert!(!cur.nearer_to_lower(&Value::Int(10), &Value::Int(25)));
    }

    #[test]
    fn test_nearer_to_lower_dates() {
        let d = |day| Value::Date(NaiveDate::from_ymd_opt(2020, 1, day).unwrap());
        assert!(d(10).nearer_to_lower(&d(8), &d(13)));
        assert!(!d(10).nearer_to_lower(&d(1), &d(11)));
    }
}
