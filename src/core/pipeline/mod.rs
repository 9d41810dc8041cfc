//! Table orchestration
//!
//! - [`coordinator`] builds the pools and dispatches tables
//! - [`worker`] runs the column pipeline of one table
//! - [`summary`] collects per-table outcomes

pub mod coordinator;
pub mod summary;
pub mod worker;

pub use coordinator::{PufCoordinator, RunOptions};
pub use summary::{RunSummary, TableReport};
pub use worker::{TableOutcome, TableWorker};
