//! External system integrations for pufgen.
//!
//! - [`database`] - Store abstraction layer (`ColumnSource` / `RowSink` traits and factories)
//! - [`csv`] - Directory of CSV files as a column source
//! - [`postgresql`] - PostgreSQL column source and row sink
//!
//! # Design Pattern
//!
//! Adapters isolate the stores behind traits so the pipeline can run against
//! PostgreSQL in production and against CSV files or in-memory fakes in tests.
//!
//! ```rust,no_run
//! use pufgen::adapters::csv::CsvDirectorySource;
//! use pufgen::adapters::database::ColumnSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = CsvDirectorySource::new("extract", ',')?;
//! let years = source.fetch_column("persons", "birth_year").await?;
//! println!("{} rows", years.len());
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod database;
pub mod postgresql;
