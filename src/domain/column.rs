//! Column model
//!
//! A [`Column`] is one table column's values in row order. It lives only
//! while one table is processed and is dropped once merged into the row
//! accumulator.

use crate::domain::value::Value;

/// A named, ordered sequence of values from one table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name as it appears in the store and the output header
    pub name: String,

    /// Values in row order
    pub values: Vec<Value>,
}

impl Column {
    /// Creates a new column
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Fills `row_count` rows with a single value
    pub fn broadcast(name: impl Into<String>, value: Value, row_count: usize) -> Self {
        Self::new(name, vec![value; row_count])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast() {
        let column = Column::broadcast("SA151_BERICHTSJAHR", Value::Int(2019), 4);
        assert_eq!(column.len(), 4);
        assert!(column.values.iter().all(|v| *v == Value::Int(2019)));
    }

    #[test]
    fn test_empty_column() {
        let column = Column::new("empty", Vec::new());
        assert!(column.is_empty());
    }
}
