//! Verification report structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Results of verifying every artifact of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the report was opened
    pub verified_at: DateTime<Utc>,

    /// Number of artifacts checked
    pub total_verified: usize,

    /// Artifacts whose header and row count matched
    pub passed: usize,

    /// Artifacts that did not match
    pub failed: usize,

    /// Details of every failed artifact
    pub failures: Vec<VerificationFailure>,
}

/// Details of an artifact that failed verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Logical table name
    pub table: String,

    /// Artifact path
    pub artifact: String,

    /// Reason for failure
    pub reason: String,
}

impl VerificationReport {
    pub fn new() -> Self {
        Self {
            verified_at: Utc::now(),
            total_verified: 0,
            passed: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_pass(&mut self) {
        self.total_verified += 1;
        self.passed += 1;
    }

    pub fn record_failure(&mut self, failure: VerificationFailure) {
        self.total_verified += 1;
        self.failed += 1;
        self.failures.push(failure);
    }

    /// Check if all verifications passed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Verification Report\n");
        summary.push_str(&format!("  Verified at: {}\n", self.verified_at));
        summary.push_str(&format!("  Artifacts verified: {}\n", self.total_verified));
        summary.push_str(&format!("  ✅ Passed: {}\n", self.passed));
        summary.push_str(&format!("  ❌ Failed: {}\n", self.failed));

        if !self.failures.is_empty() {
            summary.push_str("\n❌ Failures:\n");
            for (i, failure) in self.failures.iter().enumerate() {
                summary.push_str(&format!("  {}. Table: {}\n", i + 1, failure.table));
                summary.push_str(&format!("     Artifact: {}\n", failure.artifact));
                summary.push_str(&format!("     Reason: {}\n", failure.reason));
            }
        }

        summary
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::new()
    }
}
