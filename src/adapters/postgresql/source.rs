//! PostgreSQL column source
//!
//! Values are read as `::text` so that every store type arrives in the same
//! raw form the normalizer parses. Rows are ordered by `ctid`, which is stable
//! while the table is not written to during the run.

use super::client::{quote_column, quote_ident, PostgreSQLClient};
use crate::adapters::database::ColumnSource;
use crate::domain::{PufError, Result};
use async_trait::async_trait;
use futures::{pin_mut, StreamExt};
use std::sync::Arc;

/// Reads columns from PostgreSQL tables
pub struct PostgresSource {
    client: Arc<PostgreSQLClient>,
}

impl PostgresSource {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

fn column_query(table: &str, column: &str) -> String {
    format!(
        "SELECT {col}::text FROM {table} ORDER BY ctid",
        col = quote_column(column),
        table = quote_ident(table)
    )
}

fn distinct_query(table: &str, column: &str) -> String {
    format!(
        "SELECT DISTINCT {col}::text FROM {table}",
        col = quote_column(column),
        table = quote_ident(table)
    )
}

#[async_trait]
impl ColumnSource for PostgresSource {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let client = self.client.get_connection().await?;
        let rows = client
            .query(
                "SELECT a.attname::text FROM pg_attribute a \
                 WHERE a.attrelid = $1::text::regclass AND a.attnum > 0 AND NOT a.attisdropped \
                 ORDER BY a.attnum",
                &[&quote_ident(table)],
            )
            .await
            .map_err(|e| PufError::Database(format!("Failed to list columns of {table}: {e}")))?;

        Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect())
    }

    async fn row_count(&self, table: &str) -> Result<usize> {
        let client = self.client.get_connection().await?;
        let row = client
            .query_one(&format!("SELECT count(*) FROM {}", quote_ident(table)), &[])
            .await
            .map_err(|e| PufError::Database(format!("Failed to count rows of {table}: {e}")))?;
        let count: i64 = row.get(0);
        usize::try_from(count)
            .map_err(|_| PufError::Database(format!("Invalid row count {count} for {table}")))
    }

    async fn fetch_column(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let client = self.client.get_connection().await?;
        let stream = client
            .query_raw(column_query(table, column).as_str(), std::iter::empty::<&str>())
            .await
            .map_err(|e| {
                PufError::Database(format!("Failed to fetch {table}.{column}: {e}"))
            })?;
        pin_mut!(stream);

        let mut values = Vec::new();
        while let Some(row) = stream.next().await {
            let row = row?;
            values.push(row.get::<_, Option<String>>(0));
        }
        Ok(values)
    }

    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let client = self.client.get_connection().await?;
        let rows = client
            .query(distinct_query(table, column).as_str(), &[])
            .await
            .map_err(|e| {
                PufError::Database(format!("Failed to read distinct {table}.{column}: {e}"))
            })?;
        Ok(rows.iter().map(|row| row.get::<_, Option<String>>(0)).collect())
    }

    fn describe(&self) -> String {
        format!("postgresql:{}", self.client.connection_string_safe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_query() {
        assert_eq!(
            column_query("claims.sa151", "SA151_GEBJAHR"),
            "SELECT \"SA151_GEBJAHR\"::text FROM \"claims\".\"sa151\" ORDER BY ctid"
        );
    }

    #[test]
    fn test_distinct_query_keeps_null() {
        let sql = distinct_query("sa151", "psid");
        assert_eq!(sql, "SELECT DISTINCT \"psid\"::text FROM \"sa151\"");
    }
}
