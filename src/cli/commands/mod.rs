//! CLI command implementations
//!
//! This module contains all CLI command implementations and the exit codes
//! they report.

pub mod export;
pub mod validate;

use crate::domain::SampleError;

/// Successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Invalid configuration or arguments
pub const EXIT_CONFIG: i32 = 2;
/// The store could not be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Any other fatal error
pub const EXIT_FATAL: i32 = 5;
/// Interrupted by SIGINT/SIGTERM
pub const EXIT_INTERRUPTED: i32 = 130;

/// Exit code reported for `error`
pub fn exit_code(error: &SampleError) -> i32 {
    match error {
        SampleError::Configuration(_) => EXIT_CONFIG,
        SampleError::Interrupted => EXIT_INTERRUPTED,
        e if e.is_connection() => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}
