//! End-to-end runs over a directory of CSV tables

use async_trait::async_trait;
use pufgen::adapters::csv::CsvDirectorySource;
use pufgen::adapters::database::{ColumnSource, RowSink};
use pufgen::anonymization::satisfies_k;
use pufgen::config::{parse_config, PufConfig};
use pufgen::core::pipeline::{PufCoordinator, RunOptions};
use pufgen::domain::{PufError, Result, Value};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

fn write_extract(dir: &Path) {
    let mut persons = String::from("person_id,birth_year,sex,release\n");
    for i in 0..12 {
        let year = if i == 11 { 1990 } else { 1980 + (i % 2) };
        let sex = if i % 3 == 0 { "f" } else { "m" };
        persons.push_str(&format!("{},{},{},2019\n", 100_000 + i, year, sex));
    }
    fs::write(dir.join("persons.csv"), persons).unwrap();

    let mut visits = String::from("person_id,referrer_id,visit_date,diagnosis\n");
    for i in 0..20 {
        let day = 1 + (i % 4);
        visits.push_str(&format!(
            "{},{},2019010{},J{}\n",
            100_000 + (i % 12),
            100_000 + ((i + 1) % 12),
            day,
            10 + i
        ));
    }
    fs::write(dir.join("visits.csv"), visits).unwrap();
}

fn config(input: &Path, output: &Path, extra: &str) -> PufConfig {
    let toml = format!(
        r#"
[anonymization]
k = 3

[output]
directory = '{output}'

[source]
kind = "csv"

[source.csv]
directory = '{input}'

{extra}

[[domains]]
name = "person"
source_table = "persons"
source_column = "person_id"
primary_tables = ["persons"]

[[domains]]
name = "referrer"
alias_of = "person"

[[tables]]
name = "persons"

[[tables.columns]]
name = "person_id"
role = "identifier"
domain = "person"

[[tables.columns]]
name = "birth_year"
type = "year"

[[tables.columns]]
name = "sex"
type = "category"

[[tables.columns]]
name = "release"
role = "constant"

[[tables]]
name = "visits"

[[tables.columns]]
name = "person_id"
role = "identifier"
domain = "person"

[[tables.columns]]
name = "referrer_id"
role = "identifier"
domain = "referrer"

[[tables.columns]]
name = "visit_date"
type = "date"

[[tables.columns]]
name = "diagnosis"
type = "string"
"#,
        input = input.display(),
        output = output.display(),
    );
    parse_config(&toml).unwrap()
}

fn read_column(path: &Path, index: usize) -> Vec<Value> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| {
            let field = r.unwrap()[index].to_string();
            if field.is_empty() {
                Value::Missing
            } else {
                Value::Text(field)
            }
        })
        .collect()
}

async fn coordinator(config: PufConfig, sink: Option<Arc<dyn RowSink>>) -> PufCoordinator {
    let csv = config.source.csv.clone().unwrap();
    let source = CsvDirectorySource::new(&csv.directory, csv.delimiter).unwrap();
    PufCoordinator::with_collaborators(config, Arc::new(source), sink).unwrap()
}

#[tokio::test]
async fn test_run_produces_k_anonymous_artifacts() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_extract(input.path());

    let coordinator = coordinator(config(input.path(), output.path(), ""), None).await;
    let summary = coordinator.execute(&RunOptions::default()).await.unwrap();

    assert!(summary.is_successful(), "{}", summary.format_summary());
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.pools_built, 2);
    assert_eq!(summary.verification.passed, 2);
    assert_eq!(summary.tables[0].table, "persons");
    assert_eq!(summary.tables[0].rows, 12);
    assert_eq!(summary.tables[1].rows, 20);

    let persons = output.path().join("persons.csv");
    let visits = output.path().join("visits.csv");
    assert!(persons.exists());
    assert!(visits.exists());

    // Generalized columns satisfy k
    assert!(satisfies_k(&read_column(&persons, 1), 3).unwrap());
    assert!(satisfies_k(&read_column(&persons, 2), 3).unwrap());
    assert!(satisfies_k(&read_column(&visits, 2), 3).unwrap());
    assert!(satisfies_k(&read_column(&visits, 3), 3).unwrap());

    // Primary table receives the pool itself, same width as the originals
    let person_ids: HashSet<String> = read_column(&persons, 0)
        .into_iter()
        .map(|v| v.to_string())
        .collect();
    assert!(person_ids.len() > 1);
    assert!(person_ids
        .iter()
        .all(|id| id.len() == 6 && id.chars().all(|c| c.is_ascii_digit())));

    // Secondary tables and aliases draw from the same pool
    for index in [0, 1] {
        for id in read_column(&visits, index) {
            assert!(person_ids.contains(&id.to_string()));
        }
    }

    // Constant broadcast from the first present value
    assert!(read_column(&persons, 3)
        .iter()
        .all(|v| *v == Value::Text("2019".into())));

    // No intermediate generations are left behind
    let mut files: Vec<String> = fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    assert_eq!(files, vec!["persons.csv", "visits.csv"]);
}

#[tokio::test]
async fn test_table_selection_and_sequential_mode() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_extract(input.path());

    let coordinator = coordinator(config(input.path(), output.path(), ""), None).await;
    let options = RunOptions {
        tables: vec!["visits".to_string()],
        sequential: true,
    };
    let summary = coordinator.execute(&options).await.unwrap();

    assert_eq!(summary.tables.len(), 1);
    assert_eq!(summary.tables[0].table, "visits");
    assert!(!output.path().join("persons.csv").exists());
    assert!(output.path().join("visits.csv").exists());
}

#[tokio::test]
async fn test_unknown_table_selection_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_extract(input.path());

    let coordinator = coordinator(config(input.path(), output.path(), ""), None).await;
    let options = RunOptions {
        tables: vec!["nope".to_string()],
        sequential: false,
    };
    let err = coordinator.execute(&options).await.unwrap_err();
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_failed_table_does_not_stop_siblings() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_extract(input.path());
    // An undeclared column in the store fails only this table
    fs::write(
        input.path().join("visits.csv"),
        "person_id,referrer_id,visit_date,diagnosis,extra\n100000,100001,20190101,J10,x\n",
    )
    .unwrap();

    let coordinator = coordinator(config(input.path(), output.path(), ""), None).await;
    let summary = coordinator.execute(&RunOptions::default()).await.unwrap();

    assert_eq!(summary.successful_tables(), 1);
    assert_eq!(summary.failed_tables(), 1);
    assert_eq!(summary.exit_code(), 1);
    assert!(summary.tables[1].error.as_deref().unwrap().contains("extra"));
    assert!(output.path().join("persons.csv").exists());
    assert!(!output.path().join("visits.csv").exists());
}

/// Source whose columns disagree with its row count
struct ShortColumnSource {
    inner: CsvDirectorySource,
}

#[async_trait]
impl ColumnSource for ShortColumnSource {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        self.inner.column_names(table).await
    }

    async fn row_count(&self, table: &str) -> Result<usize> {
        self.inner.row_count(table).await
    }

    async fn fetch_column(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let mut values = self.inner.fetch_column(table, column).await?;
        if column == "sex" {
            values.pop();
        }
        Ok(values)
    }

    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        self.inner.distinct_values(table, column).await
    }

    fn describe(&self) -> String {
        "short".to_string()
    }
}

#[tokio::test]
async fn test_row_count_mismatch_fails_table_and_cleans_up() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_extract(input.path());

    let config = config(input.path(), output.path(), "");
    let source = ShortColumnSource {
        inner: CsvDirectorySource::new(input.path(), ',').unwrap(),
    };
    let coordinator =
        PufCoordinator::with_collaborators(config, Arc::new(source), None).unwrap();
    let summary = coordinator.execute(&RunOptions::default()).await.unwrap();

    let persons = &summary.tables[0];
    assert!(persons.error.as_deref().unwrap().contains("Row count mismatch"));
    assert!(summary.tables[1].is_successful());

    let leftovers: Vec<String> = fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("persons"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

/// Sink that records what would be loaded
#[derive(Default)]
struct RecordingSink {
    prepared: Mutex<Vec<(String, String)>>,
    loaded: Mutex<HashMap<String, u64>>,
}

#[async_trait]
impl RowSink for RecordingSink {
    async fn prepare_table(&self, source_table: &str, target_table: &str) -> Result<()> {
        self.prepared
            .lock()
            .unwrap()
            .push((source_table.to_string(), target_table.to_string()));
        Ok(())
    }

    async fn load_artifact(&self, target_table: &str, artifact: &Path) -> Result<u64> {
        let mut reader = csv::Reader::from_path(artifact)?;
        let rows = reader.records().count() as u64;
        if target_table == "visits_puf" {
            return Err(PufError::Database("target unavailable".to_string()));
        }
        self.loaded
            .lock()
            .unwrap()
            .insert(target_table.to_string(), rows);
        Ok(rows)
    }
}

const TARGET: &str = r#"
[target]
table_suffix = "_puf"

[target.postgresql]
connection_string = "postgresql://puf@localhost/puf"
"#;

#[tokio::test]
async fn test_target_load_after_all_tables() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_extract(input.path());

    let sink = Arc::new(RecordingSink::default());
    let coordinator = coordinator(
        config(input.path(), output.path(), TARGET),
        Some(sink.clone() as Arc<dyn RowSink>),
    )
    .await;
    let summary = coordinator.execute(&RunOptions::default()).await.unwrap();

    assert_eq!(summary.tables[0].rows_loaded, Some(12));
    assert_eq!(summary.tables[0].target_table, "persons_puf");
    assert!(summary.tables[1]
        .error
        .as_deref()
        .unwrap()
        .contains("target unavailable"));
    assert_eq!(summary.exit_code(), 1);

    let prepared = sink.prepared.lock().unwrap().clone();
    assert!(prepared.contains(&("persons".to_string(), "persons_puf".to_string())));
    assert_eq!(sink.loaded.lock().unwrap().get("persons_puf"), Some(&12));
}

#[tokio::test]
async fn test_dry_run_skips_target_load() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_extract(input.path());

    let mut config = config(input.path(), output.path(), TARGET);
    config.application.dry_run = true;

    let sink = Arc::new(RecordingSink::default());
    let coordinator = coordinator(config, Some(sink.clone() as Arc<dyn RowSink>)).await;
    let summary = coordinator.execute(&RunOptions::default()).await.unwrap();

    assert!(summary.is_successful());
    assert!(summary.dry_run);
    assert!(summary.tables.iter().all(|t| t.rows_loaded.is_none()));
    assert!(sink.prepared.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_k_aborts_before_any_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_extract(input.path());

    let mut config = config(input.path(), output.path(), "");
    config.anonymization.k = 1;

    let coordinator = coordinator(config, None).await;
    let err = coordinator.execute(&RunOptions::default()).await.unwrap_err();
    assert!(matches!(err, PufError::InvalidParameter(_)));
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}
