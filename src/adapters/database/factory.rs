//! Store client factory
//!
//! This module provides factory functions to create source and sink clients
//! based on configuration.

use crate::adapters::csv::CsvDirectorySource;
use crate::adapters::database::traits::{ColumnSource, RowSink};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::sink::PostgresSink;
use crate::adapters::postgresql::source::PostgresSource;
use crate::config::schema::{PufConfig, SourceKind};
use crate::domain::{PufError, Result};
use std::sync::Arc;

/// Create the column source selected by `source.kind`
///
/// # Errors
///
/// Returns an error if the section for the selected kind is missing or the
/// connection pool cannot be created
pub async fn create_column_source(config: &PufConfig) -> Result<Arc<dyn ColumnSource>> {
    match config.source.kind {
        SourceKind::PostgreSQL => {
            let pg_config = config.source.postgresql.as_ref().ok_or_else(|| {
                PufError::Configuration("source.postgresql section is missing".to_string())
            })?;

            tracing::info!("Creating PostgreSQL column source");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            Ok(Arc::new(PostgresSource::new(client)) as Arc<dyn ColumnSource>)
        }
        SourceKind::Csv => {
            let csv_config = config.source.csv.as_ref().ok_or_else(|| {
                PufError::Configuration("source.csv section is missing".to_string())
            })?;

            tracing::info!(directory = %csv_config.directory, "Creating CSV column source");
            Ok(Arc::new(CsvDirectorySource::new(
                &csv_config.directory,
                csv_config.delimiter,
            )?) as Arc<dyn ColumnSource>)
        }
    }
}

/// Create the row sink for `[target]`, if loading is enabled
///
/// Returns `None` when no target is configured or the run is a dry run.
pub async fn create_row_sink(config: &PufConfig) -> Result<Option<Arc<dyn RowSink>>> {
    if !config.loads_target() {
        return Ok(None);
    }
    let Some(target) = config.target.as_ref() else {
        return Ok(None);
    };

    tracing::info!("Creating PostgreSQL row sink");
    let client = PostgreSQLClient::new(target.postgresql.clone()).await?;
    Ok(Some(
        Arc::new(PostgresSink::new(client, target.recreate_tables)) as Arc<dyn RowSink>
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[tokio::test]
    async fn test_csv_source_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            r#"
[source]
kind = "csv"

[source.csv]
directory = "{}"

[[tables]]
name = "t"

[[tables.columns]]
name = "c"
type = "integer"
"#,
            dir.path().display()
        );
        let config = parse_config(&contents).unwrap();
        let source = create_column_source(&config).await.unwrap();
        assert!(source.describe().contains("csv"));

        // No [target] means nothing to load
        assert!(create_row_sink(&config).await.unwrap().is_none());
    }
}
