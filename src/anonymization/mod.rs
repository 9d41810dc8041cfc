//! Anonymization engine
//!
//! Column-level building blocks of the public use file:
//!
//! - **Normalization**: coerce raw text to the column's semantic type ([`normalizer`])
//! - **Shuffling**: decorrelate a column from the rest of its row ([`shuffler`])
//! - **Enforcement**: generalize until every value class reaches `k` ([`enforcer`])
//! - **Pseudonymization**: substitute identifiers from per-domain pools ([`pseudonym`])
//!
//! # Usage
//!
//! ```rust
//! use pufgen::anonymization::{normalize_column, shuffle_column, KAnonymityEnforcer};
//! use pufgen::domain::SemanticType;
//!
//! let raw = vec![Some("A".to_string()); 4];
//! let values = shuffle_column(normalize_column(SemanticType::Category, raw));
//! let generalized = KAnonymityEnforcer::new(2)?.enforce(SemanticType::Category, values);
//! assert_eq!(generalized.len(), 4);
//! # Ok::<(), pufgen::domain::PufError>(())
//! ```

pub mod config;
pub mod enforcer;
pub mod normalizer;
pub mod pseudonym;
pub mod shuffler;

// Re-export main types
pub use config::AnonymizationConfig;
pub use enforcer::{policy_for, satisfies_k, GeneralizationPolicy, KAnonymityEnforcer, OTHER_BUCKET};
pub use normalizer::{normalize_column, normalize_value};
pub use pseudonym::{IdentifierPool, PoolSet, PseudonymAlphabet, PseudonymGenerator, RandomPseudonymGenerator};
pub use shuffler::shuffle_column;
