//! CLI command implementations

pub mod init;
pub mod run;
pub mod validate;

use crate::domain::PufError;

/// Process exit code for an error that stopped a command
///
/// 2 for configuration and parameter errors, 5 for everything else.
pub fn exit_code_for(error: &PufError) -> i32 {
    if error.is_fatal() {
        2
    } else {
        5
    }
}
