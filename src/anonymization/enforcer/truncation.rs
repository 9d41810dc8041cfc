//! Uniform truncation for free-text columns

use super::{value_counts, GeneralizationPolicy};
use crate::domain::Value;

/// Drops one trailing character from every value per round until each
/// class has `k` members or all values are empty
#[derive(Debug, Default, Clone, Copy)]
pub struct TruncationPolicy;

impl GeneralizationPolicy for TruncationPolicy {
    fn generalize(&self, mut values: Vec<Value>, k: usize) -> Vec<Value> {
        let mut rounds = 0usize;
        while !value_counts(&values).values().all(|&count| count >= k) {
            let mut truncated_any = false;
            for value in values.iter_mut() {
                if let Value::Text(text) = value {
                    truncated_any |= text.pop().is_some();
                }
            }
            if !truncated_any {
                break;
            }
            rounds += 1;
        }

        if rounds > 0 {
            tracing::trace!(rounds, "Truncated string column");
        }
        values
    }

    fn name(&self) -> &'static str {
        "truncation"
    }
}
