//! Per-table column pipeline
//!
//! A [`TableWorker`] owns one table at a time. Columns are processed strictly
//! one after another in store order:
//!
//! - constant columns are broadcast to the table's row count
//! - identifier columns are filled from the domain's pool
//! - every other column is fetched, normalized, shuffled and k-anonymized,
//!   in that order
//!
//! and each finished column is appended to the table's [`RowAccumulator`].
//! Store reads are awaited; CPU and file work runs on the blocking pool.

use crate::adapters::database::ColumnSource;
use crate::anonymization::{
    normalize_column, satisfies_k, shuffle_column, KAnonymityEnforcer, PoolSet,
};
use crate::core::assembler::RowAccumulator;
use crate::core::catalog::{ColumnKind, ColumnSpec, TableSpec};
use crate::domain::{Column, Result, SemanticType, Value};
use crate::{log_column_step, log_table_start};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Result of a finished table
#[derive(Debug, Clone)]
pub struct TableOutcome {
    /// Finalized artifact
    pub artifact: PathBuf,
    /// Columns appended, in artifact order
    pub columns: Vec<String>,
    /// Source row count every column was aligned to
    pub rows: usize,
}

/// Runs the column pipeline of one table
#[derive(Clone)]
pub struct TableWorker {
    source: Arc<dyn ColumnSource>,
    pools: Arc<PoolSet>,
    enforcer: KAnonymityEnforcer,
    output_dir: PathBuf,
}

impl TableWorker {
    pub fn new(
        source: Arc<dyn ColumnSource>,
        pools: Arc<PoolSet>,
        enforcer: KAnonymityEnforcer,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            pools,
            enforcer,
            output_dir: output_dir.into(),
        }
    }

    /// Processes `table` into `<output_dir>/<table>.csv`
    ///
    /// On failure the current accumulator generation is removed; stale
    /// generations of a crashed process are removed when the table next starts.
    pub async fn process(&self, table: &TableSpec) -> Result<TableOutcome> {
        let rows = self.source.row_count(&table.source_table).await?;
        let store_columns = self.source.column_names(&table.source_table).await?;
        let columns: Vec<ColumnSpec> = table
            .check_store_columns(&store_columns)?
            .into_iter()
            .cloned()
            .collect();

        log_table_start!(table.name, rows, columns.len());

        let mut accumulator = RowAccumulator::start(&self.output_dir, &table.name)?;
        for spec in &columns {
            let (returned, appended) = match self.build_column(table, spec, rows).await {
                Ok(column) => {
                    let table_name = table.name.clone();
                    tokio::task::spawn_blocking(move || {
                        let started = Instant::now();
                        let appended = accumulator.append(&column);
                        log_column_step!(table_name, column.name, "append", started);
                        (accumulator, appended)
                    })
                    .await?
                }
                Err(e) => (accumulator, Err(e)),
            };
            accumulator = returned;

            if let Err(e) = appended {
                if let Err(cleanup) = accumulator.discard() {
                    tracing::warn!(
                        table = %table.name,
                        error = %cleanup,
                        "Failed to remove accumulator generation"
                    );
                }
                return Err(e);
            }
        }

        let artifact = tokio::task::spawn_blocking(move || accumulator.finalize()).await??;

        Ok(TableOutcome {
            artifact,
            columns: columns.into_iter().map(|c| c.name).collect(),
            rows,
        })
    }

    async fn build_column(&self, table: &TableSpec, spec: &ColumnSpec, rows: usize) -> Result<Column> {
        match &spec.kind {
            ColumnKind::Constant { value } => {
                let value = match value {
                    Some(value) => Value::Text(value.clone()),
                    None => {
                        let raw = self
                            .source
                            .fetch_column(&table.source_table, &spec.name)
                            .await?;
                        raw.into_iter()
                            .flatten()
                            .next()
                            .map(Value::Text)
                            .unwrap_or(Value::Missing)
                    }
                };
                Ok(Column::broadcast(&spec.name, value, rows))
            }

            ColumnKind::Identifier { domain } => {
                let pools = Arc::clone(&self.pools);
                let domain = domain.clone();
                let table_name = table.name.clone();
                let name = spec.name.clone();
                tokio::task::spawn_blocking(move || {
                    let started = Instant::now();
                    let values = pools.assign(&domain, &table_name, rows)?;
                    log_column_step!(table_name, name, "pseudonymize", started);
                    Ok(Column::new(name, values))
                })
                .await?
            }

            ColumnKind::Generalizable(semantic_type) => {
                let started = Instant::now();
                let raw = self
                    .source
                    .fetch_column(&table.source_table, &spec.name)
                    .await?;
                log_column_step!(table.name, spec.name, "fetch", started);

                let enforcer = self.enforcer;
                let semantic_type = *semantic_type;
                let table_name = table.name.clone();
                let name = spec.name.clone();
                tokio::task::spawn_blocking(move || {
                    generalize(&table_name, name, semantic_type, raw, enforcer)
                })
                .await?
            }
        }
    }
}

/// Normalize, shuffle, then enforce k on one fetched column
fn generalize(
    table: &str,
    name: String,
    semantic_type: SemanticType,
    raw: Vec<Option<String>>,
    enforcer: KAnonymityEnforcer,
) -> Result<Column> {
    let started = Instant::now();
    let values = normalize_column(semantic_type, raw);
    log_column_step!(table, name, "normalize", started);

    let started = Instant::now();
    let values = shuffle_column(values);
    log_column_step!(table, name, "shuffle", started);

    let started = Instant::now();
    let values = enforcer.enforce(semantic_type, values);
    log_column_step!(table, name, "enforce", started);

    if !satisfies_k(&values, enforcer.k())? {
        tracing::warn!(
            table,
            column = %name,
            semantic_type = %semantic_type,
            k = enforcer.k(),
            "Column still has a class smaller than k after generalization"
        );
    }

    Ok(Column::new(name, values))
}
