//! PostgreSQL row sink
//!
//! Finished artifacts are streamed into the target table one row at a time.
//! A blocking reader task parses the CSV and hands rows over a bounded
//! channel, so the artifact is never held in memory. Each row is sent as a
//! JSON object and expanded server side with `json_populate_record`, which
//! casts every field to the target column's type. Empty fields load as NULL.

use super::client::{quote_ident, PostgreSQLClient};
use crate::adapters::database::RowSink;
use crate::domain::{PufError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

const ROW_BUFFER: usize = 1024;

/// Loads artifacts into PostgreSQL tables
pub struct PostgresSink {
    client: Arc<PostgreSQLClient>,
    recreate_tables: bool,
}

impl PostgresSink {
    pub fn new(client: PostgreSQLClient, recreate_tables: bool) -> Self {
        Self {
            client: Arc::new(client),
            recreate_tables,
        }
    }
}

fn recreate_sql(source_table: &str, target_table: &str) -> String {
    let target = quote_ident(target_table);
    format!(
        "DROP TABLE IF EXISTS {target}; CREATE TABLE {target} (LIKE {source} INCLUDING ALL)",
        source = quote_ident(source_table)
    )
}

fn insert_sql(target_table: &str) -> String {
    let target = quote_ident(target_table);
    format!("INSERT INTO {target} SELECT * FROM json_populate_record(NULL::{target}, $1::json)")
}

/// Builds the JSON object for one artifact row
///
/// Empty fields load as NULL, including strings truncated to zero length.
fn row_object(header: &[String], record: &csv::StringRecord) -> JsonValue {
    let mut object = Map::with_capacity(header.len());
    for (name, field) in header.iter().zip(record.iter()) {
        let value = if field.is_empty() {
            JsonValue::Null
        } else {
            JsonValue::String(field.to_string())
        };
        object.insert(name.clone(), value);
    }
    JsonValue::Object(object)
}

/// Reads `path` on the calling thread and sends each row as JSON
fn stream_artifact(path: PathBuf, tx: mpsc::Sender<Result<JsonValue>>) {
    let send_rows = || -> Result<()> {
        let mut reader = csv::Reader::from_path(&path)?;
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            if tx.blocking_send(Ok(row_object(&header, &record))).is_err() {
                // Receiver dropped; the load has already failed
                return Ok(());
            }
        }
        Ok(())
    };

    if let Err(e) = send_rows() {
        let _ = tx.blocking_send(Err(e));
    }
}

#[async_trait]
impl RowSink for PostgresSink {
    async fn prepare_table(&self, source_table: &str, target_table: &str) -> Result<()> {
        if !self.recreate_tables {
            tracing::debug!(target_table, "Keeping existing target table");
            return Ok(());
        }

        let client = self.client.get_connection().await?;
        client
            .batch_execute(&recreate_sql(source_table, target_table))
            .await
            .map_err(|e| {
                PufError::Database(format!("Failed to recreate table {target_table}: {e}"))
            })?;

        tracing::info!(source_table, target_table, "Recreated target table");
        Ok(())
    }

    async fn load_artifact(&self, target_table: &str, artifact: &Path) -> Result<u64> {
        let (tx, mut rx) = mpsc::channel(ROW_BUFFER);
        let path = artifact.to_path_buf();
        let reader = tokio::task::spawn_blocking(move || stream_artifact(path, tx));

        let mut client = self.client.get_connection().await?;
        let transaction = client.transaction().await?;
        let statement = transaction.prepare(&insert_sql(target_table)).await?;

        let mut loaded = 0u64;
        while let Some(row) = rx.recv().await {
            let row = row?;
            transaction.execute(&statement, &[&row]).await.map_err(|e| {
                PufError::Database(format!(
                    "Failed to insert row {} into {}: {}",
                    loaded + 1,
                    target_table,
                    e
                ))
            })?;
            loaded += 1;
        }
        reader.await?;

        transaction.commit().await?;
        tracing::info!(target_table, rows = loaded, "Loaded artifact");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql("puf.sa151_puf"),
            "INSERT INTO \"puf\".\"sa151_puf\" SELECT * FROM \
             json_populate_record(NULL::\"puf\".\"sa151_puf\", $1::json)"
        );
    }

    #[test]
    fn test_recreate_sql() {
        let sql = recreate_sql("sa151", "sa151_puf");
        assert!(sql.starts_with("DROP TABLE IF EXISTS \"sa151_puf\";"));
        assert!(sql.ends_with("(LIKE \"sa151\" INCLUDING ALL)"));
    }

    #[test]
    fn test_row_object_maps_empty_to_null() {
        let header = vec!["id".to_string(), "year".to_string()];
        let record = csv::StringRecord::from(vec!["123", ""]);
        let object = row_object(&header, &record);
        assert_eq!(object["id"], JsonValue::String("123".to_string()));
        assert_eq!(object["year"], JsonValue::Null);
    }

    #[tokio::test]
    async fn test_stream_artifact_sends_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a,b\n1,x\n2,\n").unwrap();

        let (tx, mut rx) = mpsc::channel(1);
        let reader = tokio::task::spawn_blocking(move || stream_artifact(path, tx));

        let mut rows = Vec::new();
        while let Some(row) = rx.recv().await {
            rows.push(row.unwrap());
        }
        reader.await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["b"], JsonValue::Null);
    }

    #[tokio::test]
    async fn test_stream_artifact_reports_missing_file() {
        let (tx, mut rx) = mpsc::channel(1);
        let reader = tokio::task::spawn_blocking(move || {
            stream_artifact(PathBuf::from("/nonexistent/artifact.csv"), tx)
        });
        assert!(rx.recv().await.unwrap().is_err());
        reader.await.unwrap();
    }
}
