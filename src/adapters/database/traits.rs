//! Store abstraction traits
//!
//! This module defines the traits that source and destination adapters must
//! implement to work with pufgen.

use crate::domain::Result;
use async_trait::async_trait;
use std::path::Path;

/// Read side of the backing store
///
/// Every fetch for the same table must return rows in the same order, so
/// that independently processed columns line up again in the accumulator.
#[async_trait]
pub trait ColumnSource: Send + Sync {
    /// Test the connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Column names of `table`, in store order
    async fn column_names(&self, table: &str) -> Result<Vec<String>>;

    /// Number of rows in `table`
    async fn row_count(&self, table: &str) -> Result<usize>;

    /// Raw values of one column in stable row order; `None` is a missing value
    async fn fetch_column(&self, table: &str, column: &str) -> Result<Vec<Option<String>>>;

    /// Distinct values of one column; a missing value counts once, as `None`
    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<Option<String>>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Write side of the target store
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Make `target_table` ready to receive rows shaped like `source_table`
    async fn prepare_table(&self, source_table: &str, target_table: &str) -> Result<()>;

    /// Stream a finished artifact into `target_table`, one row at a time
    ///
    /// # Returns
    ///
    /// The number of rows loaded.
    async fn load_artifact(&self, target_table: &str, artifact: &Path) -> Result<u64>;
}
