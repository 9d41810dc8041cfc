//! Single-pass "Other" bucket merge for categorical columns
//!
//! Classes with fewer than `k` members are offending. If there is only one of
//! them, or together they still fall short of `k`, they are folded into
//! [`OTHER_BUCKET`] along with the smallest valid class. Otherwise only the
//! offending classes are folded. The merge runs once and is not re-checked:
//! when the smallest valid class is itself too small to cover the deficit the
//! bucket can stay below `k`.

use super::GeneralizationPolicy;
use crate::domain::Value;
use std::collections::{HashMap, HashSet};

/// Label of the merged bucket
pub const OTHER_BUCKET: &str = "Other";

/// Folds rare categories into a shared `"Other"` bucket
#[derive(Debug, Default, Clone, Copy)]
pub struct CategoryMergePolicy;

impl GeneralizationPolicy for CategoryMergePolicy {
    fn generalize(&self, values: Vec<Value>, k: usize) -> Vec<Value> {
        // (value, count) in order of first appearance
        let mut classes: Vec<(&Value, usize)> = Vec::new();
        let mut positions: HashMap<&Value, usize> = HashMap::new();
        for value in &values {
            match positions.get(value) {
                Some(&idx) => classes[idx].1 += 1,
                None => {
                    positions.insert(value, classes.len());
                    classes.push((value, 1));
                }
            }
        }

        let (offending, valid): (Vec<_>, Vec<_>) =
            classes.into_iter().partition(|(_, count)| *count < k);
        if offending.is_empty() {
            return values;
        }

        let offending_total: usize = offending.iter().map(|(_, count)| count).sum();
        let mut merged: HashSet<Value> = offending.iter().map(|(v, _)| (*v).clone()).collect();

        if offending.len() == 1 || offending_total < k {
            if let Some((smallest, count)) = valid.iter().min_by_key(|(_, count)| *count) {
                tracing::debug!(
                    class = %smallest,
                    count,
                    "Merging smallest valid class into Other bucket"
                );
                merged.insert((*smallest).clone());
            }
        }

        tracing::debug!(
            offending_classes = offending.len(),
            offending_total,
            merged_classes = merged.len(),
            "Merging categories"
        );

        values
            .into_iter()
            .map(|value| {
                if merged.contains(&value) {
                    Value::Text(OTHER_BUCKET.to_string())
                } else {
                    value
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "category_merge"
    }
}
