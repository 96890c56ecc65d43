//! CLI exit codes.
//!
//! Exit codes:
//! - 0: Success (JSON result on stdout)
//! - 1: Recoverable error: bad input, domain violation, unreadable config,
//!   or an unavailable oracle when validation is required
//! - 2: Blocking failure: the oracle disagreed with the computed result

use std::process::ExitCode;

use gyrograph_core::{GyroError, ValidationRecord, ValidationStatus};

/// Exit codes for CLI commands.
///
/// Exit 2 is ONLY for oracle discrepancies, where the printed result must
/// not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    /// Success - result on stdout
    Success = 0,
    /// Recoverable error - reason on stderr
    Warning = 1,
    /// Result contradicted by the oracle
    Blocking = 2,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<CliExitCode> for i32 {
    fn from(code: CliExitCode) -> Self {
        code as i32
    }
}

impl From<&GyroError> for CliExitCode {
    fn from(err: &GyroError) -> Self {
        match err {
            // Every engine error is caller-correctable
            GyroError::Domain { .. }
            | GyroError::Conversion { .. }
            | GyroError::DimensionMismatch { .. }
            | GyroError::ModelMismatch { .. }
            | GyroError::InvalidCurvature(_)
            | GyroError::InvalidConfig(_)
            | GyroError::InvalidParameter { .. }
            | GyroError::DegenerateTransformation { .. }
            | GyroError::UnknownOperation(_)
            | GyroError::InvalidArguments { .. }
            | GyroError::NumericalFailure { .. } => CliExitCode::Warning,
        }
    }
}

impl CliExitCode {
    /// Exit code for a finished computation.
    ///
    /// No record means validation was not requested. `UNAVAILABLE` only
    /// fails the command when `require_validation` is set.
    pub fn for_validation(record: Option<&ValidationRecord>, require_validation: bool) -> Self {
        match record.map(ValidationRecord::status) {
            None | Some(ValidationStatus::Confirmed) => CliExitCode::Success,
            Some(ValidationStatus::Discrepant) => CliExitCode::Blocking,
            Some(ValidationStatus::Unavailable) | Some(ValidationStatus::Pending) => {
                if require_validation {
                    CliExitCode::Warning
                } else {
                    CliExitCode::Success
                }
            }
        }
    }
}

/// Determine exit code for any error.
///
/// Engine errors map through [`CliExitCode::from`]. Everything else (I/O,
/// JSON, TOML, oracle setup) is recoverable.
pub fn exit_code_for_error(e: &(dyn std::error::Error + 'static)) -> CliExitCode {
    match e.downcast_ref::<GyroError>() {
        Some(gyro_err) => CliExitCode::from(gyro_err),
        None => CliExitCode::Warning,
    }
}
