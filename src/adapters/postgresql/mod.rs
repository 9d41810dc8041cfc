//! PostgreSQL adapters
//!
//! [`PostgresSource`] reads columns from the original tables and
//! [`PostgresSink`] loads finished artifacts into the target tables. Both
//! share the pooled [`PostgreSQLClient`].

pub mod client;
pub mod sink;
pub mod source;

pub use client::{quote_ident, PostgreSQLClient};
pub use sink::PostgresSink;
pub use source::PostgresSource;
