//! Post-finalize artifact checks

use crate::domain::{PufError, Result};
use std::path::Path;

/// Shape of a finished artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStats {
    pub columns: Vec<String>,
    pub rows: usize,
}

/// Re-reads `path` and checks its header and row count
///
/// The artifact is streamed, so this is safe for tables of any size. Ragged
/// records surface as [`PufError::Csv`].
///
/// # Errors
///
/// Returns [`PufError::Validation`] if the header differs from
/// `expected_columns` or the row count differs from `expected_rows`.
pub fn verify_artifact(
    path: &Path,
    expected_columns: &[String],
    expected_rows: usize,
) -> Result<ArtifactStats> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    if columns != expected_columns {
        return Err(PufError::Validation(format!(
            "{}: header {:?} does not match declared columns {:?}",
            path.display(),
            columns,
            expected_columns
        )));
    }

    let mut record = csv::StringRecord::new();
    let mut rows = 0usize;
    while reader.read_record(&mut record)? {
        rows += 1;
    }

    if rows != expected_rows {
        return Err(PufError::Validation(format!(
            "{}: expected {} rows, found {}",
            path.display(),
            expected_rows,
            rows
        )));
    }

    tracing::debug!(artifact = %path.display(), rows, "Artifact verified");
    Ok(ArtifactStats { columns, rows })
}
