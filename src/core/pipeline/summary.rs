//! Run summary and reporting

use crate::core::verification::VerificationReport;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one table
#[derive(Debug, Clone)]
pub struct TableReport {
    /// Logical table name
    pub table: String,

    /// Target table the artifact is loaded into
    pub target_table: String,

    /// Rows in the source table and the artifact
    pub rows: usize,

    /// Columns written to the artifact
    pub columns: usize,

    /// Finished artifact, absent if the table failed
    pub artifact: Option<PathBuf>,

    /// Whether the artifact passed verification, absent if it was never checked
    pub verified: Option<bool>,

    /// Rows loaded into the target, absent if no load ran
    pub rows_loaded: Option<u64>,

    /// Processing time of the table
    pub duration: Duration,

    /// Error that stopped the table or its load
    pub error: Option<String>,
}

impl TableReport {
    pub fn new(table: impl Into<String>, target_table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            target_table: target_table.into(),
            rows: 0,
            columns: 0,
            artifact: None,
            verified: None,
            rows_loaded: None,
            duration: Duration::from_secs(0),
            error: None,
        }
    }

    /// Record the error that stopped this table
    pub fn fail(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
    }

    pub fn is_successful(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a whole run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Anonymity parameter the run used
    pub k: usize,

    /// Identifier pools built before dispatch
    pub pools_built: usize,

    /// Per-table outcomes in declaration order
    pub tables: Vec<TableReport>,

    /// Artifact verification results
    pub verification: VerificationReport,

    /// Whether the target load was skipped
    pub dry_run: bool,

    /// Duration of the run
    pub duration: Duration,
}

impl RunSummary {
    pub fn new(k: usize, dry_run: bool) -> Self {
        Self {
            k,
            pools_built: 0,
            tables: Vec::new(),
            verification: VerificationReport::new(),
            dry_run,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn successful_tables(&self) -> usize {
        self.tables.iter().filter(|t| t.is_successful()).count()
    }

    pub fn failed_tables(&self) -> usize {
        self.tables.len() - self.successful_tables()
    }

    /// Total rows written to artifacts by successful tables
    pub fn total_rows(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| t.is_successful())
            .map(|t| t.rows)
            .sum()
    }

    /// Check if every table succeeded
    pub fn is_successful(&self) -> bool {
        self.failed_tables() == 0
    }

    /// Process exit code: 0 when every table succeeded, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_successful() {
            0
        } else {
            1
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            k = self.k,
            pools = self.pools_built,
            tables = self.tables.len(),
            successful = self.successful_tables(),
            failed = self.failed_tables(),
            rows = self.total_rows(),
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            "Run completed"
        );

        for report in self.tables.iter().filter(|t| !t.is_successful()) {
            tracing::warn!(
                table = %report.table,
                error = report.error.as_deref().unwrap_or_default(),
                "Table failed"
            );
        }
    }

    /// Format the summary as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        out.push_str("📊 Run Summary\n");
        out.push_str(&format!("  k: {}\n", self.k));
        out.push_str(&format!("  Identifier pools: {}\n", self.pools_built));
        out.push_str(&format!("  Duration: {:.2}s\n", self.duration.as_secs_f64()));
        out.push_str(&format!(
            "  Tables: {} ({} succeeded, {} failed)\n",
            self.tables.len(),
            self.successful_tables(),
            self.failed_tables()
        ));
        if self.dry_run {
            out.push_str("  Target load skipped (dry run)\n");
        }

        for report in &self.tables {
            match &report.error {
                None => {
                    out.push_str(&format!(
                        "  ✅ {}: {} rows x {} columns",
                        report.table, report.rows, report.columns
                    ));
                    if let Some(artifact) = &report.artifact {
                        out.push_str(&format!(" -> {}", artifact.display()));
                    }
                    if let Some(loaded) = report.rows_loaded {
                        out.push_str(&format!(" ({} rows loaded into {})", loaded, report.target_table));
                    }
                    out.push('\n');
                }
                Some(error) => {
                    out.push_str(&format!("  ❌ {}: {}\n", report.table, error));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn succeeded(table: &str, rows: usize) -> TableReport {
        let mut report = TableReport::new(table, format!("{table}_puf"));
        report.rows = rows;
        report.columns = 3;
        report.artifact = Some(PathBuf::from(format!("out/{table}.csv")));
        report
    }

    #[test]
    fn test_run_summary_creation() {
        let summary = RunSummary::new(5, false);
        assert_eq!(summary.k, 5);
        assert!(summary.tables.is_empty());
        assert!(summary.is_successful());
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_partial_failure() {
        let mut summary = RunSummary::new(5, false);
        summary.tables.push(succeeded("persons", 10));
        let mut failed = TableReport::new("visits", "visits_puf");
        failed.fail("Database error: connection reset");
        summary.tables.push(failed);

        assert_eq!(summary.successful_tables(), 1);
        assert_eq!(summary.failed_tables(), 1);
        assert_eq!(summary.total_rows(), 10);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_format_summary() {
        let mut summary = RunSummary::new(3, true).with_duration(Duration::from_millis(1500));
        let mut report = succeeded("persons", 4);
        report.rows_loaded = Some(4);
        summary.tables.push(report);

        let text = summary.format_summary();
        assert!(text.contains("k: 3"));
        assert!(text.contains("persons: 4 rows x 3 columns"));
        assert!(text.contains("4 rows loaded into persons_puf"));
        assert!(text.contains("dry run"));
    }
}
