//! Streaming row assembler
//!
//! Columns of one table are processed independently and joined back into rows
//! on disk. The accumulator is a chain of CSV generations
//! `<table>_<g>.csv`, each one column wider than the last:
//!
//! - the first appended column is written directly as generation 0
//! - every further column reads generation `g` row by row, writes generation
//!   `g + 1` with the new value appended, then deletes generation `g`
//! - [`RowAccumulator::finalize`] renames the last generation to `<table>.csv`
//!
//! At most two generations exist at once and memory holds one column plus one
//! row. Row counts never change: a column of a different length fails with
//! [`PufError::RowCountMismatch`] and the partial generation is removed.
//!
//! Missing values are written as empty fields, so a string truncated to zero
//! length cannot be told apart from a missing one once it is on disk. The
//! target load turns both into NULL.

use crate::domain::{Column, PufError, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Path of generation `generation` of `table`
pub fn generation_path(directory: &Path, table: &str, generation: usize) -> PathBuf {
    directory.join(format!("{table}_{generation}.csv"))
}

/// Path of the finished artifact of `table`
pub fn artifact_path(directory: &Path, table: &str) -> PathBuf {
    directory.join(format!("{table}.csv"))
}

/// Removes generations left behind by an interrupted run
///
/// # Returns
///
/// The number of files removed.
pub fn discard_stale(directory: &Path, table: &str) -> Result<usize> {
    if !directory.is_dir() {
        return Ok(0);
    }

    let pattern = Regex::new(&format!(r"^{}_\d+\.csv$", regex::escape(table)))
        .map_err(|e| PufError::Other(format!("Invalid generation pattern: {e}")))?;

    let mut removed = 0;
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if pattern.is_match(name) && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            tracing::warn!(table, file = name, "Discarded stale accumulator generation");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Row-oriented accumulator for one table
#[derive(Debug)]
pub struct RowAccumulator {
    directory: PathBuf,
    table: String,
    generation: Option<usize>,
    rows: Option<usize>,
    columns: Vec<String>,
}

impl RowAccumulator {
    /// Prepares an empty accumulator for `table` under `directory`
    ///
    /// Creates the directory if needed and discards stale generations of the
    /// same table. Generation 0 is written by the first [`append`](Self::append).
    pub fn start(directory: impl Into<PathBuf>, table: &str) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        discard_stale(&directory, table)?;

        Ok(Self {
            directory,
            table: table.to_string(),
            generation: None,
            rows: None,
            columns: Vec::new(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Latest written generation
    pub fn generation(&self) -> Option<usize> {
        self.generation
    }

    /// Row count fixed by the first column
    pub fn row_count(&self) -> Option<usize> {
        self.rows
    }

    /// Header of the latest generation
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Path of the latest generation
    pub fn current_path(&self) -> Option<PathBuf> {
        self.generation
            .map(|g| generation_path(&self.directory, &self.table, g))
    }

    /// Appends one column and returns the new generation number
    ///
    /// # Errors
    ///
    /// Returns [`PufError::RowCountMismatch`] if the column length differs
    /// from the accumulator's row count.
    pub fn append(&mut self, column: &Column) -> Result<usize> {
        if let Some(expected) = self.rows {
            if expected != column.len() {
                return Err(self.mismatch(column, expected, column.len()));
            }
        }

        let next = match self.generation {
            None => {
                self.write_first(column)?;
                0
            }
            Some(current) => {
                let next = current + 1;
                let next_path = generation_path(&self.directory, &self.table, next);
                if let Err(e) = self.write_next(current, &next_path, column) {
                    let _ = fs::remove_file(&next_path);
                    return Err(e);
                }
                fs::remove_file(generation_path(&self.directory, &self.table, current))?;
                next
            }
        };

        self.generation = Some(next);
        self.rows = Some(column.len());
        self.columns.push(column.name.clone());

        tracing::debug!(
            table = %self.table,
            column = %column.name,
            generation = next,
            rows = column.len(),
            "Appended column to accumulator"
        );
        Ok(next)
    }

    fn write_first(&self, column: &Column) -> Result<()> {
        let path = generation_path(&self.directory, &self.table, 0);
        let mut writer = Writer::from_path(&path)?;
        writer.write_record([column.name.as_str()])?;
        for value in &column.values {
            writer.write_record([value.render()])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_next(&self, current: usize, next_path: &Path, column: &Column) -> Result<()> {
        let current_path = generation_path(&self.directory, &self.table, current);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&current_path)?;
        let mut writer = Writer::from_path(next_path)?;

        let mut header = reader.headers()?.clone();
        header.push_field(&column.name);
        writer.write_record(&header)?;

        let mut record = StringRecord::new();
        let mut values = column.values.iter();
        let mut rows = 0usize;
        while reader.read_record(&mut record)? {
            let Some(value) = values.next() else {
                return Err(self.mismatch(column, rows + 1 + count_remaining(&mut reader)?, column.len()));
            };
            record.push_field(&value.render());
            writer.write_record(&record)?;
            rows += 1;
        }
        if rows != column.len() {
            return Err(self.mismatch(column, rows, column.len()));
        }

        writer.flush()?;
        Ok(())
    }

    fn mismatch(&self, column: &Column, expected: usize, actual: usize) -> PufError {
        PufError::RowCountMismatch {
            table: self.table.clone(),
            column: column.name.clone(),
            expected,
            actual,
        }
    }

    /// Renames the last generation to `<table>.csv`, replacing any earlier artifact
    ///
    /// # Errors
    ///
    /// Returns [`PufError::Validation`] if no column was appended.
    pub fn finalize(self) -> Result<PathBuf> {
        let Some(generation) = self.generation else {
            return Err(PufError::Validation(format!(
                "Table '{}' has no columns to finalize",
                self.table
            )));
        };

        let from = generation_path(&self.directory, &self.table, generation);
        let to = artifact_path(&self.directory, &self.table);
        fs::rename(&from, &to)?;

        tracing::info!(
            table = %self.table,
            artifact = %to.display(),
            columns = self.columns.len(),
            rows = self.rows.unwrap_or(0),
            "Finalized table artifact"
        );
        Ok(to)
    }

    /// Removes the current generation after a failed table
    pub fn discard(self) -> Result<()> {
        if let Some(path) = self.current_path() {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

fn count_remaining<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<usize> {
    let mut record = StringRecord::new();
    let mut remaining = 0;
    while reader.read_record(&mut record)? {
        remaining += 1;
    }
    Ok(remaining)
}
