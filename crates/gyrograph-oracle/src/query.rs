//! Oracle query and answer types.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// Numeric type the answer must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedType {
    #[default]
    Real,
    NonNegativeReal,
}

impl ExpectedType {
    pub fn admits(self, value: f64) -> bool {
        match self {
            ExpectedType::Real => value.is_finite(),
            ExpectedType::NonNegativeReal => value.is_finite() && value >= 0.0,
        }
    }
}

/// One oracle request: an expression to evaluate plus how to read the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleQuery {
    pub expression: Expr,
    pub expected: ExpectedType,
    pub assumptions: Vec<String>,
}

impl OracleQuery {
    pub fn compute(expression: Expr, expected: ExpectedType) -> Self {
        Self {
            expression,
            expected,
            assumptions: Vec::new(),
        }
    }

    pub fn with_assumptions(mut self, assumptions: impl IntoIterator<Item = String>) -> Self {
        self.assumptions.extend(assumptions);
        self
    }

    /// Assumptions attached to every query over a space with `c = -κ`.
    pub fn default_assumptions(c: f64) -> Vec<String> {
        vec!["Poincaré ball model".to_string(), format!("c = {c}")]
    }

    /// Query text: the rendered expression, then `assuming` and the
    /// assumptions joined by `and`.
    pub fn text(&self) -> String {
        let expression = self.expression.render();
        if self.assumptions.is_empty() {
            expression
        } else {
            format!("{expression} assuming {}", self.assumptions.join(" and "))
        }
    }
}

/// Oracle reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleAnswer {
    /// The oracle produced a value of the expected type.
    pub confirmed: bool,
    pub value: Option<f64>,
    pub error: Option<String>,
}

impl OracleAnswer {
    pub fn value(value: f64) -> Self {
        Self {
            confirmed: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            confirmed: false,
            value: None,
            error: Some(reason.into()),
        }
    }
}
