//! Points in the three models of hyperbolic space.
//!
//! A [`Point`] is an immutable coordinate tuple tagged with its [`Model`].
//! Construction does not validate: the domain constraint depends on the
//! curvature, so every operation runs the point through the space's
//! [`StabilityGuard`](crate::guard::StabilityGuard) instead.
//!
//! # Coordinates
//!
//! - Poincare / Klein: n coordinates, `sqrt(c)·||p|| < 1`
//! - Hyperboloid: n + 1 coordinates `(x0, x1..xn)`, `x0² - Σxi² = 1/c`, `x0 > 0`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GyroError;

/// Representation of hyperbolic space a point is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    /// Poincare ball (conformal).
    Poincare,
    /// Beltrami-Klein ball (geodesics are straight chords).
    Klein,
    /// Upper sheet of the two-sheeted hyperboloid (Weierstrass coordinates).
    Hyperboloid,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::Poincare, Model::Klein, Model::Hyperboloid];

    pub fn name(self) -> &'static str {
        match self {
            Model::Poincare => "poincare",
            Model::Klein => "klein",
            Model::Hyperboloid => "hyperboloid",
        }
    }

    /// True for the two ball models.
    #[inline]
    pub fn is_ball(self) -> bool {
        !matches!(self, Model::Hyperboloid)
    }

    /// Number of stored coordinates for a space of the given dimension.
    #[inline]
    pub fn coordinate_count(self, dimension: usize) -> usize {
        match self {
            Model::Hyperboloid => dimension + 1,
            _ => dimension,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = GyroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "poincare" | "poincaré" | "ball" => Ok(Model::Poincare),
            "klein" | "beltrami-klein" => Ok(Model::Klein),
            "hyperboloid" | "lorentz" | "weierstrass" => Ok(Model::Hyperboloid),
            other => Err(GyroError::invalid_parameter(
                "model",
                format!("unknown model '{other}' (expected poincare, klein or hyperboloid)"),
            )),
        }
    }
}

/// Immutable point in one of the hyperbolic models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    model: Model,
    coords: Vec<f64>,
}

impl Point {
    pub fn new(model: Model, coords: impl Into<Vec<f64>>) -> Self {
        Self {
            model,
            coords: coords.into(),
        }
    }

    pub fn poincare(coords: impl Into<Vec<f64>>) -> Self {
        Self::new(Model::Poincare, coords)
    }

    pub fn klein(coords: impl Into<Vec<f64>>) -> Self {
        Self::new(Model::Klein, coords)
    }

    pub fn hyperboloid(coords: impl Into<Vec<f64>>) -> Self {
        Self::new(Model::Hyperboloid, coords)
    }

    /// Ball-model origin of the given dimension.
    pub fn ball_origin(model: Model, dimension: usize) -> Self {
        debug_assert!(model.is_ball());
        Self::new(model, vec![0.0; dimension])
    }

    #[inline]
    pub fn model(&self) -> Model {
        self.model
    }

    #[inline]
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn into_coords(self) -> Vec<f64> {
        self.coords
    }

    /// Intrinsic dimension n (the hyperboloid stores n + 1 coordinates).
    pub fn dimension(&self) -> usize {
        match self.model {
            Model::Hyperboloid => self.coords.len().saturating_sub(1),
            _ => self.coords.len(),
        }
    }

    /// Euclidean norm of the stored coordinates.
    pub fn euclidean_norm(&self) -> f64 {
        self.coords.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|x| x.is_finite())
    }

    /// Largest absolute coordinate difference, or `None` when the points
    /// live in different models or have different lengths.
    pub fn max_abs_diff(&self, other: &Point) -> Option<f64> {
        if self.model != other.model || self.coords.len() != other.coords.len() {
            return None;
        }
        Some(
            self.coords
                .iter()
                .zip(other.coords.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max),
        )
    }

    /// Same model, same length, every coordinate within `tolerance`.
    pub fn approx_eq(&self, other: &Point, tolerance: f64) -> bool {
        self.max_abs_diff(other)
            .map(|diff| diff <= tolerance)
            .unwrap_or(false)
    }

    pub(crate) fn with_coords(&self, coords: Vec<f64>) -> Self {
        Self {
            model: self.model,
            coords,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.model)?;
        for (i, x) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, ")")
    }
}
