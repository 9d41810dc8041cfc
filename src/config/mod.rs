//! Configuration management for pufgen.
//!
//! # Overview
//!
//! pufgen uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PUFGEN_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry-run switch
//! - [`AnonymizationConfig`](crate::anonymization::AnonymizationConfig) - the anonymity parameter `k`
//! - [`ProcessingConfig`] - table-level parallelism
//! - [`OutputConfig`] - artifact directory
//! - [`SourceConfig`] - PostgreSQL or CSV source store
//! - [`TargetConfig`] - optional PostgreSQL destination
//! - [`LoggingConfig`] - file logging
//! - [`DomainConfig`] - identifier domains
//! - [`TableConfig`] / [`ColumnConfig`] - per-table column declarations
//!
//! # Example Configuration
//!
//! ```toml
//! [anonymization]
//! k = 5
//!
//! [source]
//! kind = "postgresql"
//!
//! [source.postgresql]
//! connection_string = "${PUFGEN_SOURCE_DSN}"
//!
//! [[domains]]
//! name = "insurant"
//! source_table = "vbj2019sa151"
//! source_column = "sa151_psid"
//! primary_tables = ["SA151"]
//!
//! [[tables]]
//! name = "SA151"
//! source_table = "vbj2019sa151"
//!
//! [[tables.columns]]
//! name = "sa151_psid"
//! role = "identifier"
//! domain = "insurant"
//!
//! [[tables.columns]]
//! name = "sa151_geburtsjahr"
//! type = "year"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ColumnConfig, CsvSourceConfig, DomainConfig, LoggingConfig, OutputConfig,
    PostgreSQLConfig, ProcessingConfig, PufConfig, SourceConfig, SourceKind, TableConfig,
    TargetConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
