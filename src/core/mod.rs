//! Core business logic for pufgen.
//!
//! # Modules
//!
//! - [`catalog`] - Resolved table, column and identifier-domain declarations
//! - [`assembler`] - Disk-backed row accumulator joining columns into rows
//! - [`pipeline`] - Pool construction, table dispatch and target load
//! - [`verification`] - Post-finalize artifact checks
//!
//! # Run Workflow
//!
//! 1. **Validate**: check `k` and resolve the schema catalog
//! 2. **Pools**: build one pseudonym pool per identifier domain
//! 3. **Dispatch**: one task per table, bounded by `max_parallel_tables`
//! 4. **Columns**: normalize, shuffle, enforce k (or pseudonymize, or broadcast)
//!    and append each column to the accumulator
//! 5. **Finalize**: rename the last generation and verify the artifact
//! 6. **Load** (optional): stream artifacts into the target store
//! 7. **Report**: log and print the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use pufgen::config::load_config;
//! use pufgen::core::pipeline::{PufCoordinator, RunOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pufgen.toml")?;
//! let coordinator = PufCoordinator::new(config).await?;
//!
//! let summary = coordinator.execute(&RunOptions::default()).await?;
//! println!("{}", summary.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod catalog;
pub mod pipeline;
pub mod verification;
