//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an
//! optional rolling file layer.
//!
//! # Example
//!
//! ```no_run
//! use pufgen::logging::init_logging;
//! use pufgen::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(table = "persons", "Processing table");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a table
///
/// # Example
///
/// ```no_run
/// use pufgen::log_table_start;
///
/// log_table_start!("persons", 1200, 8);
/// ```
#[macro_export]
macro_rules! log_table_start {
    ($table:expr, $rows:expr, $columns:expr) => {
        tracing::info!(
            table = %$table,
            rows = $rows,
            columns = $columns,
            "Processing table"
        );
    };
}

/// Log one timed step of a column pipeline
///
/// # Example
///
/// ```no_run
/// use pufgen::log_column_step;
/// use std::time::Instant;
///
/// let started = Instant::now();
/// log_column_step!("persons", "birth_year", "shuffle", started);
/// ```
#[macro_export]
macro_rules! log_column_step {
    ($table:expr, $column:expr, $step:expr, $started:expr) => {
        tracing::debug!(
            table = %$table,
            column = %$column,
            step = $step,
            duration_ms = $started.elapsed().as_millis() as u64,
            "Column step finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use pufgen::log_error_with_context;
/// use pufgen::domain::PufError;
///
/// let error = PufError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
