//! Anonymization configuration

use super::enforcer::check_k;
use crate::domain::Result;
use serde::{Deserialize, Serialize};

/// `[anonymization]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Minimum class size every generalized column must reach
    #[serde(default = "default_k")]
    pub k: usize,
}

impl AnonymizationConfig {
    /// # Errors
    ///
    /// Returns [`crate::domain::PufError::InvalidParameter`] if `k < 2`.
    pub fn validate(&self) -> Result<()> {
        check_k(self.k)
    }
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self { k: default_k() }
    }
}

fn default_k() -> usize {
    5
}
