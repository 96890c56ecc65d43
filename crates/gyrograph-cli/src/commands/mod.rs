//! CLI command handlers
//!
//! # Modules
//!
//! - `compute`: one computation, optionally cross-checked (`compute`, `verify`)
//! - `batch`: JSON array of requests computed in parallel
//! - `operations`: list facade operations and their signatures
//! - `output`: stdout rendering
//!
//! Handlers return the process exit code; results go to stdout and errors
//! to stderr.

pub mod batch;
pub mod compute;
pub mod operations;
pub mod output;

use gyrograph_core::Computation;
use tracing::{error, warn};

use crate::error::{exit_code_for_error, CliExitCode};

/// Report `err` on stderr and map it to an exit code.
pub(crate) fn fail(err: &anyhow::Error) -> i32 {
    error!(error = %format!("{err:#}"), "Command failed");
    eprintln!("Error: {err:#}");
    let code: CliExitCode = exit_code_for_error(err.root_cause());
    code.into()
}

pub(crate) fn log_warnings(computation: &Computation) {
    for warning in &computation.warnings {
        warn!(
            operation = %computation.operation,
            extended_precision = warning.extended_precision,
            "{}",
            warning
        );
    }
}
