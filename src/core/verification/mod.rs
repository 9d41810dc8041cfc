//! Artifact verification
//!
//! After a table is finalized its artifact is re-read and checked against the
//! declared column list and the source row count.

pub mod report;
pub mod verify;

pub use report::{VerificationFailure, VerificationReport};
pub use verify::{verify_artifact, ArtifactStats};
