//! Validation records produced by the oracle layer.
//!
//! A [`ValidationRecord`] starts `PENDING` and moves exactly once to
//! `CONFIRMED`, `DISCREPANT` or `UNAVAILABLE`. A discrepancy is logged at
//! error level when it is recorded and is reported by
//! [`ensure_consistent`](ValidationRecord::ensure_consistent) for the
//! lifetime of the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::compute::{ComputeValue, Operation};
use crate::point::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Pending,
    Confirmed,
    Discrepant,
    Unavailable,
}

impl ValidationStatus {
    pub fn is_final(self) -> bool {
        !matches!(self, ValidationStatus::Pending)
    }
}

/// Oracle comparison of one result component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCheck {
    pub index: usize,
    /// Expression sent to the oracle for this component.
    pub expression: String,
    pub computed: f64,
    pub oracle: f64,
    pub difference: f64,
    /// Bound the difference was compared against.
    pub bound: f64,
}

impl ComponentCheck {
    pub fn within_tolerance(&self) -> bool {
        self.difference <= self.bound
    }
}

/// Computed and oracle values diverged beyond tolerance.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "Oracle discrepancy for {operation} (record {record_id}): {failed} of {total} components differ, max difference {max_difference:e} (relative tolerance {tolerance:e})"
)]
pub struct OracleDiscrepancy {
    pub record_id: Uuid,
    pub operation: Operation,
    pub failed: usize,
    pub total: usize,
    pub max_difference: f64,
    pub tolerance: f64,
}

/// Outcome of cross-checking one computation against an oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub operation: Operation,
    pub model: Model,
    /// Human-readable description of the checked call.
    pub descriptor: String,
    pub result: ComputeValue,
    status: ValidationStatus,
    /// Relative tolerance of the comparison.
    pub tolerance: f64,
    /// Largest observed difference, once compared.
    pub error_bound: Option<f64>,
    pub checks: Vec<ComponentCheck>,
    /// Oracle requests sent, retries included.
    pub attempts: u32,
    /// Why the record is `UNAVAILABLE`.
    pub reason: Option<String>,
}

impl ValidationRecord {
    pub fn pending(
        operation: Operation,
        model: Model,
        descriptor: impl Into<String>,
        result: ComputeValue,
        tolerance: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            operation,
            model,
            descriptor: descriptor.into(),
            result,
            status: ValidationStatus::Pending,
            tolerance,
            error_bound: None,
            checks: Vec::new(),
            attempts: 0,
            reason: None,
        }
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ValidationStatus::Confirmed
    }

    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Resolve from component checks: `CONFIRMED` if every component is
    /// within tolerance, `DISCREPANT` otherwise.
    ///
    /// Returns the new status. A record that is already final is left
    /// unchanged.
    pub fn resolve(&mut self, checks: Vec<ComponentCheck>) -> ValidationStatus {
        if self.status.is_final() {
            debug!(record = %self.id, status = ?self.status, "Ignoring resolution of final record");
            return self.status;
        }
        self.error_bound = checks.iter().map(|c| c.difference).reduce(f64::max);
        let consistent = checks.iter().all(ComponentCheck::within_tolerance);
        self.checks = checks;

        if consistent {
            self.status = ValidationStatus::Confirmed;
        } else {
            self.status = ValidationStatus::Discrepant;
            if let Err(discrepancy) = self.ensure_consistent() {
                error!(
                    record = %self.id,
                    operation = %self.operation,
                    descriptor = %self.descriptor,
                    error = %discrepancy,
                    "Oracle discrepancy"
                );
            }
        }
        self.status
    }

    /// Mark `UNAVAILABLE` with a reason. A final record is left unchanged.
    pub fn mark_unavailable(&mut self, reason: impl Into<String>) -> ValidationStatus {
        if self.status.is_final() {
            debug!(record = %self.id, status = ?self.status, "Ignoring unavailability of final record");
            return self.status;
        }
        self.status = ValidationStatus::Unavailable;
        self.reason = Some(reason.into());
        self.status
    }

    /// `Err` while the record is `DISCREPANT`.
    pub fn ensure_consistent(&self) -> Result<(), OracleDiscrepancy> {
        if self.status != ValidationStatus::Discrepant {
            return Ok(());
        }
        Err(OracleDiscrepancy {
            record_id: self.id,
            operation: self.operation,
            failed: self.checks.iter().filter(|c| !c.within_tolerance()).count(),
            total: self.checks.len(),
            max_difference: self.error_bound.unwrap_or(f64::NAN),
            tolerance: self.tolerance,
        })
    }
}
