//! Error types for gyrovector operations.
//!
//! Fatal conditions (domain violations, failed conversions, bad arguments)
//! are [`GyroError`] variants and abort the call immediately. Precision
//! degradation near a model boundary is NOT an error: it is recorded as a
//! [`NumericalInstabilityWarning`] in a [`Diagnostics`] sink and the call
//! completes normally.
//!
//! # Propagation
//!
//! - `Domain` / `Conversion`: fail fast, never recovered internally
//! - instability: attached to the result as metadata
//! - oracle conditions: live on the validation record, never here

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::point::Model;

/// Result type alias for gyrovector operations.
pub type GyroResult<T> = Result<T, GyroError>;

/// Error type for all fallible geometry operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GyroError {
    // ========== Domain Errors ==========
    /// Point violates the open-domain constraint of its model.
    #[error("Domain error in {model} model: {reason} (norm = {norm})")]
    Domain {
        model: Model,
        norm: f64,
        reason: String,
    },

    /// Source point is invalid for the requested conversion.
    #[error("Conversion from {from} to {to} failed: {source}")]
    Conversion {
        from: Model,
        to: Model,
        #[source]
        source: Box<GyroError>,
    },

    /// Coordinate count does not match the space.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Point is tagged with a model the operation does not accept.
    #[error("Model mismatch: expected {expected}, got {actual}")]
    ModelMismatch { expected: Model, actual: Model },

    // ========== Configuration Errors ==========
    /// Curvature must be finite and negative.
    #[error("Invalid curvature: {0} (must be finite and negative)")]
    InvalidCurvature(f64),

    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========== Operation Errors ==========
    /// Scalar or vector parameter outside its accepted range.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Mobius transformation with ad - bc = 0.
    #[error("Degenerate Mobius transformation: |ad - bc| = {determinant:e}")]
    DegenerateTransformation { determinant: f64 },

    /// Operation name not recognized by the facade.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Wrong number or kind of arguments for a facade operation.
    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },

    /// A computation produced a non-finite value.
    #[error("Numerical failure in {operation}: {details}")]
    NumericalFailure { operation: String, details: String },
}

impl GyroError {
    pub(crate) fn domain(model: Model, norm: f64, reason: impl Into<String>) -> Self {
        Self::Domain {
            model,
            norm,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_arguments(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn numerical(operation: impl Into<String>, details: impl Into<String>) -> Self {
        Self::NumericalFailure {
            operation: operation.into(),
            details: details.into(),
        }
    }

    /// True for errors caused by a point outside its model's domain,
    /// including conversions whose source failed the guard.
    pub fn is_domain_violation(&self) -> bool {
        match self {
            Self::Domain { .. } => true,
            Self::Conversion { source, .. } => source.is_domain_violation(),
            _ => false,
        }
    }
}

/// What kind of precision degradation was observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstabilityKind {
    /// Input lies within the boundary epsilon of the ball.
    NearBoundary { margin: f64 },
    /// Lorentz factor of an input exceeded the configured ceiling.
    GammaCeiling { gamma: f64, ceiling: f64 },
    /// Result rounded onto the boundary and was pulled back inside.
    BoundaryProjection { norm: f64 },
}

/// Non-fatal precision-degradation flag attached to a successful result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalInstabilityWarning {
    /// Operation that raised the warning.
    pub operation: String,
    #[serde(flatten)]
    pub kind: InstabilityKind,
    /// Whether the extended-precision kernel was used for the computation.
    pub extended_precision: bool,
}

impl fmt::Display for NumericalInstabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InstabilityKind::NearBoundary { margin } => {
                write!(f, "{}: input within {:e} of the boundary", self.operation, margin)?
            }
            InstabilityKind::GammaCeiling { gamma, ceiling } => write!(
                f,
                "{}: gamma {:e} exceeds ceiling {:e}",
                self.operation, gamma, ceiling
            )?,
            InstabilityKind::BoundaryProjection { norm } => write!(
                f,
                "{}: result norm {} rounded onto the boundary, projected inside",
                self.operation, norm
            )?,
        }
        if self.extended_precision {
            write!(f, " (extended precision)")?;
        }
        Ok(())
    }
}

/// Per-call sink for instability warnings.
///
/// Components hold an optional shared reference to a `Diagnostics`; when
/// none is attached, warnings are only logged.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: RefCell<Vec<NumericalInstabilityWarning>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and store a warning.
    pub fn record(&self, warning: NumericalInstabilityWarning) {
        warn!(
            operation = %warning.operation,
            kind = ?warning.kind,
            extended_precision = warning.extended_precision,
            "Numerical instability"
        );
        self.warnings.borrow_mut().push(warning);
    }

    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    /// Snapshot of the recorded warnings.
    pub fn warnings(&self) -> Vec<NumericalInstabilityWarning> {
        self.warnings.borrow().clone()
    }

    pub fn into_warnings(self) -> Vec<NumericalInstabilityWarning> {
        self.warnings.into_inner()
    }
}

/// Record a warning in an optional sink, logging it either way.
pub(crate) fn emit(diagnostics: Option<&Diagnostics>, warning: NumericalInstabilityWarning) {
    match diagnostics {
        Some(sink) => sink.record(warning),
        None => warn!(
            operation = %warning.operation,
            kind = ?warning.kind,
            "Numerical instability (no diagnostics sink attached)"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_domain() {
        let err = GyroError::domain(Model::Poincare, 1.5, "norm must be < 1");
        let msg = err.to_string();
        assert!(msg.contains("1.5"));
        assert!(msg.contains("poincare"));
        assert!(err.is_domain_violation());
    }

    #[test]
    fn test_conversion_wraps_domain_source() {
        let inner = GyroError::domain(Model::Klein, 1.2, "norm must be < 1");
        let err = GyroError::Conversion {
            from: Model::Klein,
            to: Model::Poincare,
            source: Box::new(inner),
        };
        let msg = err.to_string();
        assert!(msg.contains("klein"));
        assert!(msg.contains("1.2"));
        assert!(err.is_domain_violation());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_display_dimension_mismatch() {
        let err = GyroError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
        assert!(!err.is_domain_violation());
    }

    #[test]
    fn test_diagnostics_collects_warnings() {
        let diag = Diagnostics::new();
        assert!(diag.is_empty());

        emit(
            Some(&diag),
            NumericalInstabilityWarning {
                operation: "add".to_string(),
                kind: InstabilityKind::NearBoundary { margin: 1e-13 },
                extended_precision: true,
            },
        );

        assert_eq!(diag.len(), 1);
        let warnings = diag.into_warnings();
        assert_eq!(warnings[0].operation, "add");
        assert!(warnings[0].to_string().contains("extended precision"));
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = NumericalInstabilityWarning {
            operation: "parallel_transport".to_string(),
            kind: InstabilityKind::GammaCeiling {
                gamma: 2e6,
                ceiling: 1e6,
            },
            extended_precision: true,
        };
        let json = serde_json::to_string(&warning).expect("serialize");
        assert!(json.contains("\"kind\":\"gamma_ceiling\""));
        let back: NumericalInstabilityWarning = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, warning);
    }
}
