//! In-process oracle that evaluates the expression tree in `f64`.
//!
//! Used offline and in tests. It evaluates the textbook formulas, so it
//! catches errors in the stabilized implementation but not in the formulas
//! themselves.

use async_trait::async_trait;
use tracing::debug;

use crate::error::OracleResult;
use crate::query::{OracleAnswer, OracleQuery};
use crate::service::ComputationalOracle;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceOracle;

impl ReferenceOracle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ComputationalOracle for ReferenceOracle {
    fn name(&self) -> &str {
        "reference"
    }

    async fn query(&self, query: &OracleQuery) -> OracleResult<OracleAnswer> {
        let value = query.expression.eval();
        debug!(value, expression = %query.expression, "Reference evaluation");
        if query.expected.admits(value) {
            Ok(OracleAnswer::value(value))
        } else {
            Ok(OracleAnswer::rejected(format!(
                "expression evaluates to {value}, expected {:?}",
                query.expected
            )))
        }
    }
}
