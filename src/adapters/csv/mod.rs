//! CSV directory source
//!
//! Each table is a `<table>.csv` file with a header row. A fetch reads the
//! file once and keeps only the requested column, so memory stays at one
//! column no matter how wide the file is. File order is the row order.
//!
//! CSV cannot tell an empty string from a missing value; empty fields are
//! read as missing.

use crate::adapters::database::ColumnSource;
use crate::domain::{PufError, Result};
use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Reads tables from a directory of CSV files
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    directory: PathBuf,
    delimiter: u8,
}

impl CsvDirectorySource {
    /// # Errors
    ///
    /// Returns [`PufError::Configuration`] if `delimiter` is not ASCII.
    pub fn new(directory: impl Into<PathBuf>, delimiter: char) -> Result<Self> {
        let delimiter = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                PufError::Configuration(format!("CSV delimiter '{delimiter}' is not ASCII"))
            })?;
        Ok(Self {
            directory: directory.into(),
            delimiter,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.directory.join(format!("{table}.csv"))
    }

    fn open(&self, table: &str) -> Result<csv::Reader<std::fs::File>> {
        let path = self.table_path(table);
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(&path)
            .map_err(|e| PufError::Csv(format!("Failed to open {}: {}", path.display(), e)))
    }

    fn read_headers(&self, table: &str) -> Result<Vec<String>> {
        let mut reader = self.open(table)?;
        Ok(reader.headers()?.iter().map(str::to_string).collect())
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        let mut reader = self.open(table)?;
        let mut record = StringRecord::new();
        let mut rows = 0usize;
        while reader.read_record(&mut record)? {
            rows += 1;
        }
        Ok(rows)
    }

    fn read_column(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let mut reader = self.open(table)?;
        let index = reader
            .headers()?
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| {
                PufError::Csv(format!("Column '{column}' not found in {table}.csv"))
            })?;

        let mut values = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let value = record.get(index).filter(|field| !field.is_empty());
            values.push(value.map(str::to_string));
        }
        Ok(values)
    }

    fn read_distinct(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let distinct: BTreeSet<Option<String>> =
            self.read_column(table, column)?.into_iter().collect();
        Ok(distinct.into_iter().collect())
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(CsvDirectorySource) -> Result<T> + Send + 'static,
    {
        let this = self.clone();
        tokio::task::spawn_blocking(move || f(this)).await?
    }
}

#[async_trait]
impl ColumnSource for CsvDirectorySource {
    async fn test_connection(&self) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(PufError::Io(format!(
                "CSV source directory not found: {}",
                self.directory.display()
            )));
        }
        Ok(())
    }

    async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let table = table.to_string();
        self.blocking(move |s| s.read_headers(&table)).await
    }

    async fn row_count(&self, table: &str) -> Result<usize> {
        let table = table.to_string();
        self.blocking(move |s| s.count_rows(&table)).await
    }

    async fn fetch_column(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let (table, column) = (table.to_string(), column.to_string());
        self.blocking(move |s| s.read_column(&table, &column)).await
    }

    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let (table, column) = (table.to_string(), column.to_string());
        self.blocking(move |s| s.read_distinct(&table, &column)).await
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.directory.display())
    }
}
