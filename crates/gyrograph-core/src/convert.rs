//! Bijections between the Poincare ball, Klein ball and hyperboloid.
//!
//! With c = -κ and g = 1 - c·||·||² the conformal gap of the source:
//!
//! | from → to | formula |
//! |---|---|
//! | Poincare → Klein | `k = 2p / (1 + c||p||²)` |
//! | Klein → Poincare | `p = k / (1 + sqrt(g_k))` |
//! | Poincare → hyperboloid | `x0 = (1 + c||p||²) / (sqrt(c)·g_p)`, `xi = 2pi / g_p` |
//! | hyperboloid → Poincare | `p = x1..n / (1 + sqrt(c)·x0)` |
//! | Klein → hyperboloid | `x0 = 1 / (sqrt(c)·sqrt(g_k))`, `xi = ki / sqrt(g_k)` |
//! | hyperboloid → Klein | `k = x1..n / (sqrt(c)·x0)` |
//!
//! Every source point is checked by the guard first; a failure is wrapped
//! in [`GyroError::Conversion`].
//!
//! The Klein ball compresses the boundary region quadratically, so Poincare
//! points within ~1e-8 of the boundary have no distinct Klein image in
//! `f64`. Those images are projected inside and flagged.

use crate::backend::CompensatedKernel;
use crate::error::{emit, Diagnostics, GyroError, GyroResult, InstabilityKind, NumericalInstabilityWarning};
use crate::guard::{ensure_finite, Stability};
use crate::point::{Model, Point};
use crate::space::GyrovectorSpace;

#[derive(Debug, Clone, Copy)]
pub struct ModelConverter<'a> {
    space: &'a GyrovectorSpace,
    diagnostics: Option<&'a Diagnostics>,
}

impl<'a> ModelConverter<'a> {
    pub fn new(space: &'a GyrovectorSpace, diagnostics: Option<&'a Diagnostics>) -> Self {
        Self { space, diagnostics }
    }

    /// Convert `point` to `target`. Returns a clone when the model already
    /// matches (after validation).
    ///
    /// # Errors
    /// `Conversion` wrapping the guard's error if the source is invalid.
    pub fn convert(&self, point: &Point, target: Model) -> GyroResult<Point> {
        self.admit(point, target)?;
        let source = point.model();
        let c = self.space.c();
        let sqrt_c = self.space.sqrt_c();
        let x = point.coords();

        let coords = match (source, target) {
            (from, to) if from == to => return Ok(point.clone()),
            (Model::Poincare, Model::Klein) => {
                let scale = 2.0 / (1.0 + c * squared_norm(x));
                x.iter().map(|xi| scale * xi).collect()
            }
            (Model::Klein, Model::Poincare) => {
                let gap = gap(c, x);
                let scale = 1.0 / (1.0 + gap.sqrt());
                x.iter().map(|xi| scale * xi).collect()
            }
            (Model::Poincare, Model::Hyperboloid) => {
                let gap = gap(c, x);
                let mut coords = Vec::with_capacity(x.len() + 1);
                coords.push((1.0 + c * squared_norm(x)) / (sqrt_c * gap));
                coords.extend(x.iter().map(|xi| 2.0 * xi / gap));
                coords
            }
            (Model::Klein, Model::Hyperboloid) => {
                let root = gap(c, x).sqrt();
                let mut coords = Vec::with_capacity(x.len() + 1);
                coords.push(1.0 / (sqrt_c * root));
                coords.extend(x.iter().map(|xi| xi / root));
                coords
            }
            (Model::Hyperboloid, Model::Poincare) => {
                let scale = 1.0 / (1.0 + sqrt_c * x[0]);
                x[1..].iter().map(|xi| scale * xi).collect()
            }
            (Model::Hyperboloid, Model::Klein) => {
                let scale = 1.0 / (sqrt_c * x[0]);
                x[1..].iter().map(|xi| scale * xi).collect()
            }
            // equal models returned above
            (_, _) => return Ok(point.clone()),
        };

        let operation = operation_name(target);
        let coords = ensure_finite(operation, coords)?;
        let coords = if target.is_ball() {
            self.contain(operation, coords)
        } else {
            coords
        };
        Ok(Point::new(target, coords))
    }

    /// Klein coordinates of a Poincare (or hyperboloid) point.
    pub fn to_klein(&self, point: &Point) -> GyroResult<Point> {
        self.convert(point, Model::Klein)
    }

    /// Poincare coordinates of a Klein (or hyperboloid) point.
    pub fn to_poincare(&self, point: &Point) -> GyroResult<Point> {
        self.convert(point, Model::Poincare)
    }

    /// Weierstrass coordinates `(x0, x1..xn)` of a ball point.
    pub fn to_hyperboloid(&self, point: &Point) -> GyroResult<Point> {
        self.convert(point, Model::Hyperboloid)
    }

    fn admit(&self, point: &Point, target: Model) -> GyroResult<()> {
        let stability = self
            .space
            .guard()
            .check(point)
            .map_err(|source| GyroError::Conversion {
                from: point.model(),
                to: target,
                source: Box::new(source),
            })?;
        if let Stability::NearBoundary { margin } = stability {
            emit(
                self.diagnostics,
                NumericalInstabilityWarning {
                    operation: operation_name(target).to_string(),
                    kind: InstabilityKind::NearBoundary { margin },
                    extended_precision: true,
                },
            );
        }
        Ok(())
    }

    fn contain(&self, operation: &str, coords: Vec<f64>) -> Vec<f64> {
        let norm = squared_norm(&coords).sqrt();
        let (coords, projected) = self.space.guard().contain(coords);
        if projected {
            emit(
                self.diagnostics,
                NumericalInstabilityWarning {
                    operation: operation.to_string(),
                    kind: InstabilityKind::BoundaryProjection { norm },
                    extended_precision: true,
                },
            );
        }
        coords
    }
}

fn operation_name(target: Model) -> &'static str {
    match target {
        Model::Poincare => "to_poincare",
        Model::Klein => "to_klein",
        Model::Hyperboloid => "to_hyperboloid",
    }
}

fn squared_norm(x: &[f64]) -> f64 {
    x.iter().map(|xi| xi * xi).sum()
}

/// Conformal gap kept accurate near the boundary.
fn gap(c: f64, x: &[f64]) -> f64 {
    CompensatedKernel::conformal_gap_dd(c, x).to_f64()
}
