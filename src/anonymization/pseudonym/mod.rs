//! Pseudonym pool management
//!
//! Identifier columns are replaced by fresh synthetic identifiers drawn from a
//! per-domain [`IdentifierPool`]. Pools are built once per run into a
//! [`PoolSet`] and shared read-only by every table worker.

pub mod generator;
pub mod pool;

pub use generator::{PseudonymAlphabet, PseudonymGenerator, RandomPseudonymGenerator};
pub use pool::{distinct_widths, IdentifierPool, PoolSet};
