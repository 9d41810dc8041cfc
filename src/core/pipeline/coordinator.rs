//! Run coordinator - main orchestrator of a PUF run
//!
//! The coordinator validates parameters, builds every identifier pool once,
//! dispatches one [`TableWorker`] task per table and, after every table has
//! finished, loads the artifacts into the target store.

use crate::adapters::database::{create_column_source, create_row_sink, ColumnSource, RowSink};
use crate::anonymization::{KAnonymityEnforcer, PoolSet, RandomPseudonymGenerator};
use crate::config::PufConfig;
use crate::core::catalog::{SchemaCatalog, TableSpec};
use crate::core::pipeline::summary::{RunSummary, TableReport};
use crate::core::pipeline::worker::TableWorker;
use crate::core::verification::{verify_artifact, VerificationFailure};
use crate::domain::Result;
use crate::log_error_with_context;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Options of a single run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Tables to process; empty means every declared table
    pub tables: Vec<String>,

    /// Process one table at a time
    pub sequential: bool,
}

/// Run coordinator
pub struct PufCoordinator {
    config: PufConfig,
    catalog: Arc<SchemaCatalog>,
    source: Arc<dyn ColumnSource>,
    sink: Option<Arc<dyn RowSink>>,
}

impl PufCoordinator {
    /// Create a coordinator with the stores named in `config`
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the schema catalog cannot be resolved or a
    /// store client cannot be created.
    pub async fn new(config: PufConfig) -> Result<Self> {
        let source = create_column_source(&config).await?;
        let sink = create_row_sink(&config).await?;
        Self::with_collaborators(config, source, sink)
    }

    /// Create a coordinator around existing store clients
    pub fn with_collaborators(
        config: PufConfig,
        source: Arc<dyn ColumnSource>,
        sink: Option<Arc<dyn RowSink>>,
    ) -> Result<Self> {
        let catalog = Arc::new(SchemaCatalog::from_config(&config)?);
        Ok(Self {
            config,
            catalog,
            source,
            sink,
        })
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Execute the run
    ///
    /// Anything that fails before dispatch (`k`, table selection, source
    /// connection, pool construction) is returned as an error. Once workers
    /// are dispatched, failures are recorded per table in the summary and
    /// never cancel sibling tables.
    pub async fn execute(&self, options: &RunOptions) -> Result<RunSummary> {
        let start_time = Instant::now();
        let dry_run = self.config.application.dry_run;
        let enforcer = KAnonymityEnforcer::new(self.config.anonymization.k)?;
        let mut summary = RunSummary::new(enforcer.k(), dry_run);

        let tables = self.catalog.select_tables(&options.tables)?;

        tracing::info!(
            source = %self.source.describe(),
            k = enforcer.k(),
            tables = tables.len(),
            dry_run,
            "Starting PUF run"
        );

        self.source.test_connection().await?;

        let pools = Arc::new(
            PoolSet::build(&self.catalog, self.source.as_ref(), &RandomPseudonymGenerator).await?,
        );
        summary.pools_built = pools.len();

        let worker = TableWorker::new(
            Arc::clone(&self.source),
            pools,
            enforcer,
            &self.config.output.directory,
        );

        let parallelism = if options.sequential {
            1
        } else {
            self.config.processing.parallelism(tables.len())
        };
        summary.tables = self.dispatch(worker, &tables, parallelism).await;

        for report in &summary.tables {
            match (report.verified, &report.artifact) {
                (Some(true), _) => summary.verification.record_pass(),
                (Some(false), artifact) => {
                    summary.verification.record_failure(VerificationFailure {
                        table: report.table.clone(),
                        artifact: artifact
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default(),
                        reason: report.error.clone().unwrap_or_default(),
                    })
                }
                (None, _) => {}
            }
        }

        match &self.sink {
            _ if dry_run => tracing::info!("Dry run - skipping target load"),
            Some(sink) => self.load_target(sink.as_ref(), &mut summary.tables).await,
            None => tracing::debug!("No target configured"),
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Runs every table on its own task, at most `parallelism` at once
    async fn dispatch(
        &self,
        worker: TableWorker,
        tables: &[TableSpec],
        parallelism: usize,
    ) -> Vec<TableReport> {
        tracing::info!(parallelism, "Dispatching tables");

        let semaphore = Arc::new(Semaphore::new(parallelism));
        let mut workers = JoinSet::new();

        for (index, table) in tables.iter().cloned().enumerate() {
            let worker = worker.clone();
            let semaphore = Arc::clone(&semaphore);
            workers.spawn(async move {
                let mut report = TableReport::new(&table.name, &table.target_table);
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        report.fail(e);
                        return (index, report);
                    }
                };

                let started = Instant::now();
                match worker.process(&table).await {
                    Ok(outcome) => {
                        report.rows = outcome.rows;
                        report.columns = outcome.columns.len();
                        report.artifact = Some(outcome.artifact.clone());

                        let verified = tokio::task::spawn_blocking(move || {
                            verify_artifact(&outcome.artifact, &outcome.columns, outcome.rows)
                        })
                        .await;
                        match verified {
                            Ok(Ok(_)) => report.verified = Some(true),
                            Ok(Err(e)) => {
                                tracing::error!(table = %table.name, error = %e, "Artifact verification failed");
                                report.verified = Some(false);
                                report.fail(e);
                            }
                            Err(e) => report.fail(e),
                        }
                    }
                    Err(e) => {
                        tracing::error!(table = %table.name, error = %e, "Table failed");
                        report.fail(e);
                    }
                }
                report.duration = started.elapsed();

                tracing::info!(
                    table = %table.name,
                    rows = report.rows,
                    columns = report.columns,
                    duration_ms = report.duration.as_millis() as u64,
                    success = report.is_successful(),
                    "Table finished"
                );
                (index, report)
            });
        }

        let mut slots: Vec<Option<TableReport>> = vec![None; tables.len()];
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(e) => {
                    log_error_with_context!(e, "Table worker panicked");
                }
            }
        }

        slots
            .into_iter()
            .zip(tables)
            .map(|(slot, table)| {
                slot.unwrap_or_else(|| {
                    let mut report = TableReport::new(&table.name, &table.target_table);
                    report.fail("worker terminated abnormally");
                    report
                })
            })
            .collect()
    }

    /// Loads every successful artifact into its target table
    async fn load_target(&self, sink: &dyn RowSink, reports: &mut [TableReport]) {
        for report in reports.iter_mut() {
            let Some(artifact) = report.artifact.clone() else {
                continue;
            };
            if report.error.is_some() {
                continue;
            }
            let Some(source_table) = self.catalog.table(&report.table).map(|t| t.source_table.clone())
            else {
                continue;
            };

            let loaded = async {
                sink.prepare_table(&source_table, &report.target_table).await?;
                sink.load_artifact(&report.target_table, &artifact).await
            }
            .await;

            match loaded {
                Ok(rows) => report.rows_loaded = Some(rows),
                Err(e) => {
                    tracing::error!(
                        table = %report.table,
                        target_table = %report.target_table,
                        error = %e,
                        "Target load failed"
                    );
                    report.fail(e);
                }
            }
        }
    }
}
