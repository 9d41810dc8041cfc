// pufgen - k-anonymous public use file generator
// Copyright (c) 2025 Pufgen Contributors
// Licensed under the MIT License

//! # pufgen - k-anonymous public use files
//!
//! pufgen turns a relational dataset of identifying records into a public use
//! file: every retained attribute satisfies k-anonymity, identifying keys are
//! replaced with synthetic pseudonyms, and no table is ever held in memory as
//! a whole.
//!
//! ## Overview
//!
//! For every table, columns are processed one at a time:
//! - **Generalizable** columns are normalized, shuffled independently of every
//!   other column, and generalized until each value class has at least `k` rows
//! - **Identifier** columns are filled from a pool of fresh pseudonyms sized to
//!   the domain's distinct values
//! - **Constant** columns are broadcast to every row
//!
//! Finished columns are joined back into rows on disk, one generation file at
//! a time, and the final artifact can be loaded into PostgreSQL.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Schema catalog, row assembler, pipeline and verification
//! - [`anonymization`] - Normalizer, shuffler, k-anonymity enforcer, pseudonym pools
//! - [`adapters`] - CSV and PostgreSQL stores
//! - [`domain`] - Values, columns and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pufgen::config::load_config;
//! use pufgen::core::pipeline::{PufCoordinator, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("pufgen.toml")?;
//!     let coordinator = PufCoordinator::new(config).await?;
//!
//!     let summary = coordinator.execute(&RunOptions::default()).await?;
//!     println!("Wrote {} rows", summary.total_rows());
//!     Ok(())
//! }
//! ```
//!
//! ## Enforcing k on a single column
//!
//! ```rust
//! use pufgen::anonymization::{satisfies_k, KAnonymityEnforcer};
//! use pufgen::domain::{SemanticType, Value};
//!
//! let enforcer = KAnonymityEnforcer::new(3)?;
//! let values = [10, 10, 10, 20, 20, 30].map(Value::Int).to_vec();
//! let generalized = enforcer.enforce(SemanticType::Integer, values);
//! assert!(satisfies_k(&generalized, 3)?);
//! # Ok::<(), pufgen::domain::PufError>(())
//! ```
//!
//! ## Error Handling
//!
//! All library errors are [`domain::PufError`]. `InvalidParameter`,
//! `UnsupportedType` and `Configuration` abort a run before any table is
//! dispatched; everything else fails only the table that raised it.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
