//! Identifier pools
//!
//! A pool holds one fresh pseudonym per distinct original value of a domain's
//! source column. No original to pseudonym mapping is kept: the pool is only a
//! multiset of identifiers with the original cardinality and field widths.
//!
//! Assignment is row based, not value based. A primary table receives the pool
//! in pool order for its first `len(pool)` rows and random draws afterwards;
//! every other table receives random draws only. Two rows that shared an
//! original value can therefore end up with different pseudonyms, and two
//! different originals can share one on drawn rows.

use super::generator::{PseudonymAlphabet, PseudonymGenerator};
use crate::adapters::database::ColumnSource;
use crate::core::catalog::{DomainKind, SchemaCatalog};
use crate::domain::{PufError, Result, Value};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Pseudonyms for one identifier domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierPool {
    domain: String,
    alphabet: PseudonymAlphabet,
    members: Vec<String>,
}

impl IdentifierPool {
    /// Generates one pseudonym per distinct value, each as long as the value
    /// it stands in for
    pub fn build<I, S>(
        domain: impl Into<String>,
        alphabet: PseudonymAlphabet,
        distinct_values: I,
        generator: &dyn PseudonymGenerator,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let widths = distinct_values
            .into_iter()
            .map(|value| value.as_ref().chars().count());
        Self::from_widths(domain, alphabet, widths, generator)
    }

    /// Generates one pseudonym per requested width
    pub fn from_widths(
        domain: impl Into<String>,
        alphabet: PseudonymAlphabet,
        widths: impl IntoIterator<Item = usize>,
        generator: &dyn PseudonymGenerator,
    ) -> Self {
        let members = widths
            .into_iter()
            .map(|width| generator.generate(width, alphabet))
            .collect();

        Self {
            domain: domain.into(),
            alphabet,
            members,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn alphabet(&self) -> PseudonymAlphabet {
        self.alphabet
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Produces `row_count` identifier values
    ///
    /// # Errors
    ///
    /// Returns [`PufError::Validation`] when rows are requested from an empty pool.
    pub fn assign(&self, row_count: usize, primary: bool) -> Result<Vec<Value>> {
        if row_count == 0 {
            return Ok(Vec::new());
        }
        if self.members.is_empty() {
            return Err(PufError::Validation(format!(
                "Identifier pool '{}' is empty but {} rows need a pseudonym",
                self.domain, row_count
            )));
        }

        let mut rng = rand::thread_rng();
        let fixed = if primary {
            row_count.min(self.members.len())
        } else {
            0
        };

        let mut values = Vec::with_capacity(row_count);
        values.extend(self.members[..fixed].iter().cloned().map(Value::Text));
        for _ in fixed..row_count {
            // Non-empty checked above
            if let Some(member) = self.members.choose(&mut rng) {
                values.push(Value::Text(member.clone()));
            }
        }
        Ok(values)
    }
}

/// Pseudonym width per distinct source value
///
/// The missing value is one distinct value of its own. Its pseudonym is as
/// wide as the widest present value, and one character when there is none.
pub fn distinct_widths(distinct: &[Option<String>]) -> Vec<usize> {
    let widest = distinct
        .iter()
        .flatten()
        .map(|value| value.chars().count())
        .max()
        .unwrap_or(1);
    distinct
        .iter()
        .map(|value| value.as_ref().map_or(widest, |v| v.chars().count()))
        .collect()
}

#[derive(Debug, Clone)]
struct DomainEntry {
    pool: Arc<IdentifierPool>,
    primary_tables: Vec<String>,
}

/// Every domain's pool, built once before any table is dispatched
///
/// Aliases point at the same [`Arc`] as the domain they alias. The set is
/// never mutated after [`PoolSet::build`] returns.
#[derive(Debug, Clone, Default)]
pub struct PoolSet {
    entries: HashMap<String, DomainEntry>,
}

impl PoolSet {
    /// Reads each primary domain's distinct source values and generates its pool
    pub async fn build(
        catalog: &SchemaCatalog,
        source: &dyn ColumnSource,
        generator: &dyn PseudonymGenerator,
    ) -> Result<Self> {
        let mut entries = HashMap::new();

        for domain in catalog.domains() {
            let DomainKind::Primary {
                source_table,
                source_column,
                alphabet,
                primary_tables,
            } = &domain.kind
            else {
                continue;
            };

            let started = Instant::now();
            let distinct = source.distinct_values(source_table, source_column).await?;
            let pool = IdentifierPool::from_widths(
                &domain.name,
                *alphabet,
                distinct_widths(&distinct),
                generator,
            );

            tracing::info!(
                domain = %domain.name,
                source_table = %source_table,
                source_column = %source_column,
                alphabet = %alphabet,
                pool_size = pool.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Built identifier pool"
            );

            entries.insert(
                domain.name.clone(),
                DomainEntry {
                    pool: Arc::new(pool),
                    primary_tables: primary_tables.clone(),
                },
            );
        }

        for domain in catalog.domains() {
            let DomainKind::Alias {
                alias_of,
                primary_tables,
            } = &domain.kind
            else {
                continue;
            };

            let target = catalog.resolve_domain(alias_of)?;
            let pool = entries
                .get(target)
                .map(|entry| Arc::clone(&entry.pool))
                .ok_or_else(|| {
                    PufError::Configuration(format!(
                        "Domain '{}' aliases '{}' which has no pool",
                        domain.name, alias_of
                    ))
                })?;

            tracing::debug!(domain = %domain.name, alias_of = %target, "Sharing identifier pool");
            entries.insert(
                domain.name.clone(),
                DomainEntry {
                    pool,
                    primary_tables: primary_tables.clone(),
                },
            );
        }

        Ok(Self { entries })
    }

    /// Registers a prebuilt pool
    pub fn insert(&mut self, pool: IdentifierPool, primary_tables: Vec<String>) -> Arc<IdentifierPool> {
        let pool = Arc::new(pool);
        self.entries.insert(
            pool.domain().to_string(),
            DomainEntry {
                pool: Arc::clone(&pool),
                primary_tables,
            },
        );
        pool
    }

    /// Registers `alias` as sharing the pool of `domain`
    pub fn alias(&mut self, alias: &str, domain: &str, primary_tables: Vec<String>) -> Result<()> {
        let pool = self
            .entries
            .get(domain)
            .map(|entry| Arc::clone(&entry.pool))
            .ok_or_else(|| PufError::Configuration(format!("Unknown identifier domain '{domain}'")))?;
        self.entries.insert(
            alias.to_string(),
            DomainEntry {
                pool,
                primary_tables,
            },
        );
        Ok(())
    }

    pub fn pool(&self, domain: &str) -> Option<&Arc<IdentifierPool>> {
        self.entries.get(domain).map(|entry| &entry.pool)
    }

    /// Whether `table` is a primary table of `domain`
    pub fn is_primary(&self, domain: &str, table: &str) -> bool {
        self.entries
            .get(domain)
            .map(|entry| entry.primary_tables.iter().any(|t| t == table))
            .unwrap_or(false)
    }

    /// Pseudonym column for `table` drawn from `domain`'s pool
    pub fn assign(&self, domain: &str, table: &str, row_count: usize) -> Result<Vec<Value>> {
        let pool = self.pool(domain).ok_or_else(|| {
            PufError::Configuration(format!("Unknown identifier domain '{domain}'"))
        })?;
        pool.assign(row_count, self.is_primary(domain, table))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
