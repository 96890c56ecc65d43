//! Domain validation and boundary-precision monitoring.
//!
//! Every operation admits its inputs through the [`StabilityGuard`] before
//! computing. The guard rejects points outside their model's open domain and
//! reports points so close to the boundary that `f64` loses most of the
//! conformal gap `1 - c·||p||²`; those are computed on the extended kernel
//! instead.

use crate::backend::{CompensatedKernel, DoubleDouble, Kernel};
use crate::error::{emit, Diagnostics, GyroError, GyroResult, InstabilityKind, NumericalInstabilityWarning};
use crate::point::{Model, Point};
use crate::space::GyrovectorSpace;

/// Outcome of a successful domain check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stability {
    Stable,
    /// Normalized distance to the boundary fell below `boundary_epsilon`.
    NearBoundary { margin: f64 },
}

impl Stability {
    pub fn is_near_boundary(&self) -> bool {
        matches!(self, Stability::NearBoundary { .. })
    }
}

/// Validates points against the domain of their model.
#[derive(Debug, Clone, Copy)]
pub struct StabilityGuard<'a> {
    space: &'a GyrovectorSpace,
}

impl<'a> StabilityGuard<'a> {
    pub fn new(space: &'a GyrovectorSpace) -> Self {
        Self { space }
    }

    /// Check that `point` is tagged `model` and lies in its domain.
    ///
    /// # Errors
    /// - `ModelMismatch` if the point is tagged with another model
    /// - `DimensionMismatch` if the coordinate count is wrong for the space
    /// - `Domain` if a coordinate is non-finite or the constraint fails
    pub fn validate(&self, point: &Point, model: Model) -> GyroResult<Stability> {
        if point.model() != model {
            return Err(GyroError::ModelMismatch {
                expected: model,
                actual: point.model(),
            });
        }
        self.check(point)
    }

    /// Check `point` against the model it is tagged with.
    pub fn check(&self, point: &Point) -> GyroResult<Stability> {
        let model = point.model();
        let expected = model.coordinate_count(self.space.dimension());
        if point.coords().len() != expected {
            return Err(GyroError::DimensionMismatch {
                expected,
                actual: point.coords().len(),
            });
        }
        if let Some(index) = point.coords().iter().position(|x| !x.is_finite()) {
            return Err(GyroError::domain(
                model,
                point.euclidean_norm(),
                format!("coordinate {index} is not finite"),
            ));
        }

        let margin = match model {
            Model::Poincare | Model::Klein => self.ball_margin(point)?,
            Model::Hyperboloid => self.sheet_margin(point)?,
        };

        if margin < self.space.config().boundary_epsilon {
            Ok(Stability::NearBoundary { margin })
        } else {
            Ok(Stability::Stable)
        }
    }

    /// Non-failing check. Points that fail validation report a zero margin.
    pub fn assess(&self, point: &Point) -> Stability {
        self.check(point)
            .unwrap_or(Stability::NearBoundary { margin: 0.0 })
    }

    /// `1 - sqrt(c)·||p||`, computed from the compensated gap.
    fn ball_margin(&self, point: &Point) -> GyroResult<f64> {
        let c = self.space.c();
        let gap = CompensatedKernel::conformal_gap_dd(c, point.coords()).to_f64();
        let norm = point.euclidean_norm();
        if gap <= 0.0 {
            return Err(GyroError::domain(
                point.model(),
                norm,
                format!("sqrt(c)·||p|| must be < 1 (ball radius {})", self.space.radius()),
            ));
        }
        Ok(gap / (1.0 + self.space.sqrt_c() * norm))
    }

    /// Margin of the Poincare image of a hyperboloid point.
    fn sheet_margin(&self, point: &Point) -> GyroResult<f64> {
        let c = self.space.c();
        let sqrt_c = self.space.sqrt_c();
        let coords = point.coords();
        let x0 = coords[0];
        let spatial = &coords[1..];
        let norm = point.euclidean_norm();

        if x0 <= 0.0 {
            return Err(GyroError::domain(
                Model::Hyperboloid,
                norm,
                format!("x0 must be positive (upper sheet), got {x0}"),
            ));
        }

        let form = DoubleDouble::from_product(x0, x0) - DoubleDouble::dot(spatial, spatial);
        let residual = (form.mul_f64(c) - DoubleDouble::ONE).to_f64().abs();
        let tolerance = self.space.config().hyperboloid_tolerance * (c * x0 * x0).max(1.0);
        if residual > tolerance {
            return Err(GyroError::domain(
                Model::Hyperboloid,
                norm,
                format!(
                    "x0² - Σxi² = {} but must equal 1/c = {}",
                    form.to_f64(),
                    1.0 / c
                ),
            ));
        }

        let spatial_norm = spatial.iter().map(|x| x * x).sum::<f64>().sqrt();
        Ok((1.0 + 1.0 / (sqrt_c * (x0 + spatial_norm))) / (1.0 + sqrt_c * x0))
    }

    /// Lorentz factor `1/sqrt(1 - c·||x||²)` of a ball coordinate vector.
    pub fn lorentz_factor(&self, coords: &[f64]) -> f64 {
        let gap = CompensatedKernel::conformal_gap_dd(self.space.c(), coords).to_f64();
        1.0 / gap.max(f64::MIN_POSITIVE).sqrt()
    }

    /// Validate every input of `operation` in `model` and choose the kernel.
    ///
    /// Near-boundary inputs are recorded once each and switch the whole
    /// operation to the extended kernel.
    pub(crate) fn admit(
        &self,
        operation: &str,
        model: Model,
        points: &[&Point],
        diagnostics: Option<&Diagnostics>,
    ) -> GyroResult<&'static dyn Kernel> {
        let mut near_boundary = false;
        for point in points {
            if let Stability::NearBoundary { margin } = self.validate(point, model)? {
                near_boundary = true;
                emit(
                    diagnostics,
                    NumericalInstabilityWarning {
                        operation: operation.to_string(),
                        kind: InstabilityKind::NearBoundary { margin },
                        extended_precision: true,
                    },
                );
            }
        }
        Ok(if near_boundary {
            self.space.extended_kernel()
        } else {
            self.space.kernel()
        })
    }

    /// Pull a ball result that rounded onto or past the boundary back to
    /// the last representable radius.
    ///
    /// Returns the coordinates and whether a projection was needed.
    pub(crate) fn contain(&self, coords: Vec<f64>) -> (Vec<f64>, bool) {
        let c = self.space.c();
        if CompensatedKernel::conformal_gap_dd(c, &coords).to_f64() > 0.0 {
            return (coords, false);
        }

        let norm = coords.iter().map(|x| x * x).sum::<f64>().sqrt();
        let mut target = self.space.radius() * (1.0 - f64::EPSILON);
        let mut projected = coords.clone();
        for _ in 0..8 {
            let scale = target / norm;
            projected = coords.iter().map(|x| x * scale).collect();
            if CompensatedKernel::conformal_gap_dd(c, &projected).to_f64() > 0.0 {
                break;
            }
            target *= 1.0 - f64::EPSILON;
        }
        (projected, true)
    }
}

/// Fail with `NumericalFailure` if any coordinate is non-finite.
pub(crate) fn ensure_finite(operation: &str, coords: Vec<f64>) -> GyroResult<Vec<f64>> {
    match coords.iter().position(|x| !x.is_finite()) {
        None => Ok(coords),
        Some(index) => Err(GyroError::numerical(
            operation,
            format!("coordinate {index} evaluated to {}", coords[index]),
        )),
    }
}

/// Fail with `NumericalFailure` if a scalar result is non-finite.
pub(crate) fn ensure_finite_scalar(operation: &str, value: f64) -> GyroResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GyroError::numerical(operation, format!("result evaluated to {value}")))
    }
}
