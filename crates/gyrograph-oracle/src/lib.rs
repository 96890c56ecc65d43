//! Oracle validation for gyrograph computations.
//!
//! Numeric results from [`gyrograph_core::Engine`] are described as
//! closed-form expressions, sent to a [`ComputationalOracle`] and compared
//! component by component. The oracle is advisory: failures never affect
//! the computed result, they only leave the validation `UNAVAILABLE`.
//!
//! # Architecture
//!
//! - **expr**: expression trees with Wolfram rendering and `f64` evaluation
//! - **describe**: per-operation closed forms
//! - **query**: `OracleQuery`, `OracleAnswer`
//! - **service**: the `ComputationalOracle` trait
//! - **reference**: in-process oracle
//! - **wolfram**: Wolfram|Alpha HTTP oracle
//! - **verifier**: `ValidationOracle` with timeout and retry
//! - **validated**: `ValidatedEngine` facade

pub mod describe;
pub mod error;
pub mod expr;
pub mod query;
pub mod reference;
pub mod service;
pub mod validated;
pub mod verifier;
pub mod wolfram;

pub use describe::{describe, descriptor, Description};
pub use error::{OracleError, OracleResult};
pub use expr::{Expr, Function};
pub use query::{ExpectedType, OracleAnswer, OracleQuery};
pub use reference::ReferenceOracle;
pub use service::ComputationalOracle;
pub use validated::{PendingValidation, ValidatedEngine};
pub use verifier::ValidationOracle;
pub use wolfram::WolframAlphaOracle;
