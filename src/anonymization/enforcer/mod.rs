//! K-anonymity enforcement
//!
//! Each [`SemanticType`] maps to exactly one [`GeneralizationPolicy`]:
//!
//! - numeric-like types (integer, float, date, year, month) merge
//!   under-represented values into their nearest present neighbour
//!   ([`NearestNeighborPolicy`])
//! - strings are truncated uniformly, one trailing character per round
//!   ([`TruncationPolicy`])
//! - categories and alphanumeric codes fold rare classes into an `"Other"`
//!   bucket in a single pass ([`CategoryMergePolicy`])
//!
//! Missing values form their own class in every policy.
//!
//! # Examples
//!
//! ```
//! use pufgen::anonymization::KAnonymityEnforcer;
//! use pufgen::domain::{SemanticType, Value};
//!
//! let enforcer = KAnonymityEnforcer::new(3)?;
//! let values = [10, 10, 10, 20, 20, 30].into_iter().map(Value::Int).collect();
//! let generalized = enforcer.enforce(SemanticType::Integer, values);
//! assert!(generalized.iter().all(|v| *v == Value::Int(10)));
//! # Ok::<(), pufgen::domain::PufError>(())
//! ```

pub mod category;
pub mod nearest;
pub mod truncation;

pub use category::{CategoryMergePolicy, OTHER_BUCKET};
pub use nearest::NearestNeighborPolicy;
pub use truncation::TruncationPolicy;

use crate::domain::{PufError, Result, SemanticType, Value};
use std::collections::HashMap;

/// A type-specific generalization/suppression strategy
pub trait GeneralizationPolicy: Send + Sync {
    /// Generalize `values` until every retained class has at least `k` members.
    ///
    /// The output has the same length as the input.
    fn generalize(&self, values: Vec<Value>, k: usize) -> Vec<Value>;

    /// Short policy name for logs
    fn name(&self) -> &'static str;
}

static NEAREST_NEIGHBOR: NearestNeighborPolicy = NearestNeighborPolicy;
static TRUNCATION: TruncationPolicy = TruncationPolicy;
static CATEGORY_MERGE: CategoryMergePolicy = CategoryMergePolicy;

/// Returns the policy responsible for a semantic type
pub fn policy_for(semantic_type: SemanticType) -> &'static dyn GeneralizationPolicy {
    match semantic_type {
        SemanticType::Integer
        | SemanticType::Float
        | SemanticType::Date
        | SemanticType::Year
        | SemanticType::Month => &NEAREST_NEIGHBOR,
        SemanticType::String => &TRUNCATION,
        SemanticType::Category | SemanticType::Alphanumeric => &CATEGORY_MERGE,
    }
}

/// Validates `k` for every check and enforcement entry point
pub fn check_k(k: usize) -> Result<()> {
    if k < 2 {
        return Err(PufError::InvalidParameter(format!(
            "k must be larger or equal to 2, got {k}"
        )));
    }
    Ok(())
}

/// Applies the k-anonymity policy of a column's semantic type
#[derive(Debug, Clone, Copy)]
pub struct KAnonymityEnforcer {
    k: usize,
}

impl KAnonymityEnforcer {
    /// Create an enforcer for anonymity parameter `k`
    ///
    /// # Errors
    ///
    /// Returns [`PufError::InvalidParameter`] if `k < 2`.
    pub fn new(k: usize) -> Result<Self> {
        check_k(k)?;
        Ok(Self { k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Generalize one column according to its semantic type
    pub fn enforce(&self, semantic_type: SemanticType, values: Vec<Value>) -> Vec<Value> {
        let policy = policy_for(semantic_type);
        let before = values.len();
        let generalized = policy.generalize(values, self.k);
        debug_assert_eq!(before, generalized.len());
        generalized
    }
}

/// Counts how often each value occurs, missing included
pub fn value_counts(values: &[Value]) -> HashMap<&Value, usize> {
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Whether every value class in `values` occurs at least `k` times
///
/// # Errors
///
/// Returns [`PufError::InvalidParameter`] if `k < 2`.
pub fn satisfies_k(values: &[Value], k: usize) -> Result<bool> {
    check_k(k)?;
    Ok(value_counts(values).values().all(|&count| count >= k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforcer_rejects_small_k() {
        assert!(matches!(
            KAnonymityEnforcer::new(1),
            Err(PufError::InvalidParameter(_))
        ));
        assert!(matches!(
            KAnonymityEnforcer::new(0),
            Err(PufError::InvalidParameter(_))
        ));
        assert_eq!(KAnonymityEnforcer::new(2).unwrap().k(), 2);
    }

    #[test]
    fn test_satisfies_k() {
        let values: Vec<Value> = vec![1, 1, 2, 2].into_iter().map(Value::Int).collect();
        assert!(satisfies_k(&values, 2).unwrap());
        assert!(!satisfies_k(&values, 3).unwrap());
        assert!(satisfies_k(&values, 1).is_err());
    }

    #[test]
    fn test_satisfies_k_counts_missing() {
        let values = vec![Value::Int(1), Value::Int(1), Value::Missing];
        assert!(!satisfies_k(&values, 2).unwrap());
    }

    #[test]
    fn test_policy_dispatch() {
        assert_eq!(policy_for(SemanticType::Year).name(), "nearest_neighbor");
        assert_eq!(policy_for(SemanticType::String).name(), "truncation");
        assert_eq!(policy_for(SemanticType::Alphanumeric).name(), "category_merge");
    }
}
