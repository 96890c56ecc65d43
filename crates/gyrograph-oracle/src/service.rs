//! Oracle trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::OracleResult;
use crate::query::{OracleAnswer, OracleQuery};

/// External computational-knowledge service.
///
/// An `Err` is a failed exchange (transport, HTTP, unparseable reply); an
/// `Ok` answer with `confirmed == false` means the oracle responded but
/// produced no value of the expected type.
#[async_trait]
pub trait ComputationalOracle: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn query(&self, query: &OracleQuery) -> OracleResult<OracleAnswer>;
}

#[async_trait]
impl<T: ComputationalOracle + ?Sized> ComputationalOracle for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn query(&self, query: &OracleQuery) -> OracleResult<OracleAnswer> {
        (**self).query(query).await
    }
}
