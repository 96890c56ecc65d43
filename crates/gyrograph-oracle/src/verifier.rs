//! Cross-checking computed results against a [`ComputationalOracle`].
//!
//! # Behavior
//!
//! - One query per result component, each with the default assumptions
//!   (`Poincaré ball model`, `c = <c>`) plus the configured extras
//! - Retryable failures are retried at most `max_retries` times with
//!   exponential backoff (`backoff_base_ms`, doubling)
//! - The whole verification, retries included, is bounded by `timeout_ms`
//! - A value mismatch ends in `DISCREPANT` and is logged at error level by
//!   the record; the first out-of-tolerance component stops further queries
//! - Every failure mode ends in `UNAVAILABLE`, except that checks completed
//!   before the failure still resolve `DISCREPANT` when one of them missed

use std::sync::Arc;
use std::time::Duration;

use gyrograph_core::{
    Argument, ComponentCheck, ComputeValue, GyrovectorSpace, Model, Operation, OracleSettings,
    ValidationRecord,
};
use tracing::{debug, instrument, warn};

use crate::describe::{describe, descriptor, Description};
use crate::error::OracleResult;
use crate::query::{OracleAnswer, OracleQuery};
use crate::service::ComputationalOracle;

pub struct ValidationOracle {
    oracle: Arc<dyn ComputationalOracle>,
    space: GyrovectorSpace,
}

impl std::fmt::Debug for ValidationOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationOracle")
            .field("oracle", &self.oracle.name())
            .field("settings", self.settings())
            .finish()
    }
}

impl ValidationOracle {
    /// Validator for results computed over `space`, using its oracle settings.
    pub fn new(oracle: Arc<dyn ComputationalOracle>, space: &GyrovectorSpace) -> Self {
        Self {
            oracle,
            space: space.clone(),
        }
    }

    pub fn settings(&self) -> &OracleSettings {
        self.space.oracle_settings()
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Check `result` of `operation` on `inputs` and return the resolved record.
    ///
    /// Never fails: oracle problems produce an `UNAVAILABLE` record.
    #[instrument(skip_all, fields(operation = %operation, model = %model, oracle = %self.oracle.name()))]
    pub async fn verify(
        &self,
        operation: Operation,
        model: Model,
        inputs: &[Argument],
        result: &ComputeValue,
    ) -> ValidationRecord {
        let settings = self.settings();
        let mut record = ValidationRecord::pending(
            operation,
            model,
            descriptor(operation, model, inputs),
            result.clone(),
            settings.relative_tolerance,
        );

        let Some(description) = describe(&self.space, operation, model, inputs) else {
            debug!("No symbolic description, skipping oracle");
            record.mark_unavailable(format!("no symbolic description for {operation} in {model}"));
            return record;
        };
        let computed = result.components();
        if description.components.len() != computed.len() {
            record.mark_unavailable(format!(
                "description has {} components but the result has {}",
                description.components.len(),
                computed.len()
            ));
            return record;
        }

        let timeout = Duration::from_millis(settings.timeout_ms);
        let mut checks = Vec::with_capacity(computed.len());
        let outcome = tokio::time::timeout(
            timeout,
            self.check_components(&mut record, &mut checks, description, &computed),
        )
        .await;

        match outcome {
            Ok(Ok(())) => {
                let status = record.resolve(checks);
                debug!(status = ?status, attempts = record.attempts, "Validation resolved");
            }
            _ if checks.iter().any(|check| !check.within_tolerance()) => {
                record.resolve(checks);
            }
            Ok(Err(reason)) => {
                warn!(reason = %reason, attempts = record.attempts, "Oracle unavailable");
                record.mark_unavailable(reason);
            }
            Err(_) => {
                warn!(timeout_ms = settings.timeout_ms, attempts = record.attempts, "Oracle timed out");
                record.mark_unavailable(format!("oracle timed out after {}ms", settings.timeout_ms));
            }
        }
        record
    }

    /// Query components in order, appending to `checks`, until one is out
    /// of tolerance. `Err` carries the reason the oracle could not answer.
    async fn check_components(
        &self,
        record: &mut ValidationRecord,
        checks: &mut Vec<ComponentCheck>,
        description: Description,
        computed: &[f64],
    ) -> Result<(), String> {
        let settings = self.settings();
        let Description {
            components,
            expected,
        } = description;

        let mut assumptions = OracleQuery::default_assumptions(self.space.c());
        assumptions.extend(settings.assumptions.iter().cloned());

        for (index, (expression, &value)) in components.into_iter().zip(computed).enumerate() {
            let query = OracleQuery::compute(expression, expected).with_assumptions(assumptions.clone());
            let answer = self
                .query_with_retry(record, &query)
                .await
                .map_err(|e| e.to_string())?;

            let oracle = match answer {
                OracleAnswer {
                    confirmed: true,
                    value: Some(oracle),
                    ..
                } => oracle,
                OracleAnswer { error, .. } => {
                    return Err(error.unwrap_or_else(|| "oracle returned no value".to_string()))
                }
            };

            let difference = (value - oracle).abs();
            let bound =
                settings.relative_tolerance * value.abs().max(oracle.abs()) + settings.absolute_floor;
            let check = ComponentCheck {
                index,
                expression: query.text(),
                computed: value,
                oracle,
                difference,
                bound,
            };
            let missed = !check.within_tolerance();
            checks.push(check);
            if missed {
                debug!(index, difference, bound, "Component out of tolerance");
                break;
            }
        }
        Ok(())
    }

    async fn query_with_retry(
        &self,
        record: &mut ValidationRecord,
        query: &OracleQuery,
    ) -> OracleResult<OracleAnswer> {
        let settings = self.settings();
        let mut retries = 0u32;
        loop {
            record.record_attempt();
            match self.oracle.query(query).await {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_retryable() && retries < settings.max_retries => {
                    let delay = Duration::from_millis(
                        settings
                            .backoff_base_ms
                            .saturating_mul(2u64.saturating_pow(retries)),
                    );
                    warn!(
                        retry = retries + 1,
                        max_retries = settings.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Oracle request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
