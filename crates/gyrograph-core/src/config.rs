//! Configuration types for gyrovector spaces.
//!
//! This module provides:
//! - [`SpaceConfig`]: curvature, dimension and numeric tolerances
//! - [`NumericBackend`]: arithmetic strategy selected per space
//! - [`OracleSettings`]: timeout/retry/tolerance for the validation oracle
//!
//! All structs deserialize with `#[serde(default)]` so a partial TOML file
//! only overrides the fields it names. Nothing here reads the environment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GyroError, GyroResult};

/// Default curvature (normalized hyperbolic space).
pub const DEFAULT_CURVATURE: f64 = -1.0;

/// Default dimension of the ball.
pub const DEFAULT_DIMENSION: usize = 3;

/// Distance from the boundary below which a point is flagged.
pub const DEFAULT_BOUNDARY_EPSILON: f64 = 1e-12;

/// Default oracle timeout for a whole verification.
pub const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 10_000;

/// Default number of oracle retries after the first attempt.
pub const DEFAULT_ORACLE_RETRIES: u32 = 2;

/// Arithmetic strategy for precision-sensitive primitives.
///
/// - `FastFloat`: plain `f64`
/// - `MultiPrecision`: double-double error-free transformations
/// - `ExactSymbolic`: exact rational evaluation of the rational parts,
///   rounded once; transcendental steps use `MultiPrecision`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericBackend {
    ExactSymbolic,
    MultiPrecision,
    #[default]
    FastFloat,
}

impl NumericBackend {
    pub fn name(self) -> &'static str {
        match self {
            NumericBackend::ExactSymbolic => "exact_symbolic",
            NumericBackend::MultiPrecision => "multi_precision",
            NumericBackend::FastFloat => "fast_float",
        }
    }

    /// Backend to switch to when an input is near the boundary.
    pub fn extended(self) -> Self {
        match self {
            NumericBackend::FastFloat => NumericBackend::MultiPrecision,
            other => other,
        }
    }
}

impl fmt::Display for NumericBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericBackend {
    type Err = GyroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "exact" | "exact_symbolic" | "symbolic" => Ok(NumericBackend::ExactSymbolic),
            "multi" | "multi_precision" | "high_precision" => Ok(NumericBackend::MultiPrecision),
            "fast" | "fast_float" | "float" => Ok(NumericBackend::FastFloat),
            other => Err(GyroError::InvalidConfig(format!(
                "unknown numeric backend '{other}'"
            ))),
        }
    }
}

/// Validation oracle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    /// Bound on one whole verification, retries included (default: 10s).
    pub timeout_ms: u64,
    /// Retries after the first attempt on network failure (default: 2).
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry (default: 100ms).
    pub backoff_base_ms: u64,
    /// Relative tolerance for computed vs oracle values (default: 1e-10).
    pub relative_tolerance: f64,
    /// Absolute slack added to the bound so exact zeros compare (default: 1e-12).
    pub absolute_floor: f64,
    /// Extra assumptions appended to every query.
    pub assumptions: Vec<String>,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_ORACLE_TIMEOUT_MS,
            max_retries: DEFAULT_ORACLE_RETRIES,
            backoff_base_ms: 100,
            relative_tolerance: 1e-10,
            absolute_floor: 1e-12,
            assumptions: Vec::new(),
        }
    }
}

impl OracleSettings {
    pub fn validate(&self) -> GyroResult<()> {
        if self.timeout_ms == 0 {
            return Err(GyroError::InvalidConfig(
                "oracle.timeout_ms must be > 0".to_string(),
            ));
        }
        if !(self.relative_tolerance.is_finite() && self.relative_tolerance > 0.0) {
            return Err(GyroError::InvalidConfig(format!(
                "oracle.relative_tolerance must be finite and > 0, got {}",
                self.relative_tolerance
            )));
        }
        if !(self.absolute_floor.is_finite() && self.absolute_floor >= 0.0) {
            return Err(GyroError::InvalidConfig(format!(
                "oracle.absolute_floor must be finite and >= 0, got {}",
                self.absolute_floor
            )));
        }
        Ok(())
    }
}

/// Gyrovector space configuration.
///
/// # Mathematics
/// - curvature κ < 0, c = -κ; the ball has radius 1/sqrt(c)
/// - hyperboloid: x0² - Σxi² = -1/κ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Curvature κ (must be negative, default: -1.0).
    pub curvature: f64,
    /// Intrinsic dimension n (default: 3).
    pub dimension: usize,
    /// Smallest magnitude treated as nonzero (default: 1e-15).
    pub epsilon: f64,
    /// Boundary margin below which points are flagged (default: 1e-12).
    pub boundary_epsilon: f64,
    /// Lorentz factor above which transport switches precision (default: 1e6).
    pub gamma_ceiling: f64,
    /// Relative tolerance of the hyperboloid constraint (default: 1e-9).
    pub hyperboloid_tolerance: f64,
    /// Arithmetic strategy (default: fast_float).
    pub backend: NumericBackend,
    /// Decimal places kept in memoization keys (default: 12).
    pub cache_precision: u32,
    pub oracle: OracleSettings,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            curvature: DEFAULT_CURVATURE,
            dimension: DEFAULT_DIMENSION,
            epsilon: 1e-15,
            boundary_epsilon: DEFAULT_BOUNDARY_EPSILON,
            gamma_ceiling: 1e6,
            hyperboloid_tolerance: 1e-9,
            backend: NumericBackend::FastFloat,
            cache_precision: 12,
            oracle: OracleSettings::default(),
        }
    }
}

impl SpaceConfig {
    /// Validate every field.
    ///
    /// # Errors
    /// - `InvalidCurvature` if curvature is not finite and negative
    /// - `InvalidConfig` for any other out-of-range field
    pub fn validate(&self) -> GyroResult<()> {
        if !(self.curvature.is_finite() && self.curvature < 0.0) {
            return Err(GyroError::InvalidCurvature(self.curvature));
        }
        if self.dimension == 0 {
            return Err(GyroError::InvalidConfig(
                "dimension must be >= 1".to_string(),
            ));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 1e-3) {
            return Err(GyroError::InvalidConfig(format!(
                "epsilon must be in (0, 1e-3), got {:e}",
                self.epsilon
            )));
        }
        if !(self.boundary_epsilon > 0.0 && self.boundary_epsilon < 1e-3) {
            return Err(GyroError::InvalidConfig(format!(
                "boundary_epsilon must be in (0, 1e-3), got {:e}",
                self.boundary_epsilon
            )));
        }
        if !(self.gamma_ceiling.is_finite() && self.gamma_ceiling > 1.0) {
            return Err(GyroError::InvalidConfig(format!(
                "gamma_ceiling must be finite and > 1, got {}",
                self.gamma_ceiling
            )));
        }
        if !(self.hyperboloid_tolerance > 0.0 && self.hyperboloid_tolerance < 1.0) {
            return Err(GyroError::InvalidConfig(format!(
                "hyperboloid_tolerance must be in (0, 1), got {:e}",
                self.hyperboloid_tolerance
            )));
        }
        if self.cache_precision > 15 {
            return Err(GyroError::InvalidConfig(format!(
                "cache_precision must be <= 15, got {}",
                self.cache_precision
            )));
        }
        self.oracle.validate()
    }
}
