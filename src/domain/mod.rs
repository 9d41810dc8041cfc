//! Domain models and types for pufgen.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Cell values** ([`Value`]) and the closed set of [`SemanticType`]s
//! - **Column roles** ([`ColumnRole`]) and the [`Column`] model
//! - **Error types** ([`PufError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, PufError>`]:
//!
//! ```rust
//! use pufgen::domain::{PufError, Result, SemanticType};
//!
//! fn example() -> Result<SemanticType> {
//!     // Unknown tags surface as PufError::UnsupportedType
//!     "category".parse::<SemanticType>()
//! }
//! ```

pub mod column;
pub mod errors;
pub mod result;
pub mod value;

pub use column::Column;
pub use errors::PufError;
pub use result::Result;
pub use value::{ColumnRole, SemanticType, Value};
