//! Nearest-neighbour merging for numeric-like columns
//!
//! While some class has fewer than `k` members, the offending class that
//! appears first in row order is merged into the present value closest to it.
//! Ties go to the smaller neighbour. A missing class is filled with the
//! smallest present value, and a last present class with no neighbour left
//! is folded into the missing class. Every round removes one class, so the loop runs at
//! most `distinct - 1` times.
//!
//! Work is done on classes rather than rows: a merge only updates counts and
//! records a redirect, and the column is rewritten once at the end.

use super::GeneralizationPolicy;
use crate::domain::Value;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};

#[derive(Debug, Clone, Copy)]
struct Class {
    count: usize,
    first_row: usize,
}

/// Merges rare values into their nearest present neighbour
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestNeighborPolicy;

impl GeneralizationPolicy for NearestNeighborPolicy {
    fn generalize(&self, values: Vec<Value>, k: usize) -> Vec<Value> {
        let mut present: BTreeMap<Value, Class> = BTreeMap::new();
        let mut missing: Option<Class> = None;

        for (row, value) in values.iter().enumerate() {
            let class = if value.is_missing() {
                missing.get_or_insert(Class {
                    count: 0,
                    first_row: row,
                })
            } else {
                present.entry(value.clone()).or_insert(Class {
                    count: 0,
                    first_row: row,
                })
            };
            class.count += 1;
        }

        // Offending classes keyed by first appearance; None is the missing class
        let mut offending: BTreeMap<usize, Option<Value>> = present
            .iter()
            .filter(|(_, class)| class.count < k)
            .map(|(value, class)| (class.first_row, Some(value.clone())))
            .collect();
        if let Some(class) = missing.filter(|class| class.count < k) {
            offending.insert(class.first_row, None);
        }

        let mut redirects: HashMap<Value, Value> = HashMap::new();
        let mut missing_fill: Option<Value> = None;

        while let Some((_, current)) = offending.pop_first() {
            let target = match &current {
                None => present.keys().next().cloned(),
                Some(value) => nearest_present(&present, value),
            };

            let Some(target) = target else {
                // A lone present class with no neighbour folds into the missing class
                if let (Some(value), Some(class)) = (current, missing.as_mut()) {
                    let Some(moved) = present.remove(&value) else {
                        continue;
                    };
                    let was_offending = class.count < k;
                    let old_first_row = class.first_row;
                    class.count += moved.count;
                    class.first_row = class.first_row.min(moved.first_row);
                    if was_offending {
                        offending.remove(&old_first_row);
                        if class.count < k {
                            offending.insert(class.first_row, None);
                        }
                    }
                    redirects.insert(value, Value::Missing);
                }
                continue;
            };

            let moved = match current {
                None => {
                    missing_fill = Some(target.clone());
                    missing.take()
                }
                Some(value) => {
                    let class = present.remove(&value);
                    redirects.insert(value, target.clone());
                    class
                }
            };
            let Some(moved) = moved else {
                continue;
            };

            if let Some(class) = present.get_mut(&target) {
                let was_offending = class.count < k;
                let old_first_row = class.first_row;
                class.count += moved.count;
                class.first_row = class.first_row.min(moved.first_row);
                if was_offending {
                    offending.remove(&old_first_row);
                    if class.count < k {
                        offending.insert(class.first_row, Some(target));
                    }
                }
            }
        }

        if redirects.is_empty() && missing_fill.is_none() {
            return values;
        }

        let missing_fill = missing_fill.map(|fill| resolve(&redirects, fill));
        values
            .into_iter()
            .map(|value| match value {
                Value::Missing => missing_fill.clone().unwrap_or(Value::Missing),
                other => resolve(&redirects, other),
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "nearest_neighbor"
    }
}

/// Present value closest to `value`, excluding itself; ties pick the lower one
fn nearest_present(present: &BTreeMap<Value, Class>, value: &Value) -> Option<Value> {
    let lower = present.range(..value.clone()).next_back().map(|(v, _)| v);
    let upper = present
        .range((Excluded(value.clone()), Unbounded))
        .next()
        .map(|(v, _)| v);

    match (lower, upper) {
        (Some(lower), Some(upper)) => {
            if value.nearer_to_lower(lower, upper) {
                Some(lower.clone())
            } else {
                Some(upper.clone())
            }
        }
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (None, None) => None,
    }
}

/// Follows redirects until reaching a value that is still present
fn resolve(redirects: &HashMap<Value, Value>, mut value: Value) -> Value {
    while let Some(next) = redirects.get(&value) {
        value = next.clone();
    }
    value
}
