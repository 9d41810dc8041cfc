//! Store abstraction layer
//!
//! This module provides a trait-based abstraction over the source and target
//! stores, allowing pufgen to read from PostgreSQL or CSV directories and to
//! load results into PostgreSQL.

pub mod factory;
pub mod traits;

pub use factory::{create_column_source, create_row_sink};
pub use traits::{ColumnSource, RowSink};
