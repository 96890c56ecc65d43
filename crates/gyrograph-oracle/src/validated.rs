//! Facade with an attached oracle.
//!
//! [`ValidatedEngine::compute`] returns the computation immediately together
//! with a [`PendingValidation`] future. The computation never depends on the
//! future: dropping it, or abandoning it after a timeout, cancels only the
//! oracle exchange.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;
use gyrograph_core::{Argument, Computation, Engine, GyroResult, Model, ValidationRecord};

use crate::service::ComputationalOracle;
use crate::verifier::ValidationOracle;

/// Oracle check of one computation, resolved by awaiting.
pub struct PendingValidation {
    inner: BoxFuture<'static, ValidationRecord>,
}

impl Future for PendingValidation {
    type Output = ValidationRecord;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingValidation").finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ValidatedEngine {
    engine: Engine,
    validator: Arc<ValidationOracle>,
}

impl ValidatedEngine {
    pub fn new(engine: Engine, oracle: Arc<dyn ComputationalOracle>) -> Self {
        let validator = Arc::new(ValidationOracle::new(oracle, engine.space()));
        Self { engine, validator }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn validator(&self) -> &Arc<ValidationOracle> {
        &self.validator
    }

    /// Compute synchronously and start nothing yet: the returned future
    /// queries the oracle when polled.
    ///
    /// # Errors
    /// Same as [`Engine::compute`].
    pub fn compute(
        &self,
        operation: &str,
        model: Model,
        args: &[Argument],
    ) -> GyroResult<(Computation, PendingValidation)> {
        let computation = self.engine.compute(operation, model, args)?;
        let pending = self.validate(&computation);
        Ok((computation, pending))
    }

    /// Oracle check of an existing computation.
    pub fn validate(&self, computation: &Computation) -> PendingValidation {
        let validator = Arc::clone(&self.validator);
        let operation = computation.operation;
        let model = computation.model;
        let inputs = computation.inputs.clone();
        let result = computation.result.clone();

        PendingValidation {
            inner: async move { validator.verify(operation, model, &inputs, &result).await }.boxed(),
        }
    }

    /// Compute and wait for the oracle; the record is attached as
    /// `validation`.
    pub async fn compute_validated(
        &self,
        operation: &str,
        model: Model,
        args: &[Argument],
    ) -> GyroResult<Computation> {
        let (mut computation, pending) = self.compute(operation, model, args)?;
        computation.validation = Some(pending.await);
        Ok(computation)
    }
}
