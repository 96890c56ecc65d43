//! Distances, geodesics and parallel transport.
//!
//! Distances use the gyrodistance normalization `(1/sqrt(c))·atanh(sqrt(c)·||⊖a ⊕ b||)`,
//! which is half the Riemannian distance of the ball of curvature -c. The
//! Klein and hyperboloid formulas return the same value for the same pair
//! of points.
//!
//! Geodesics are gyrolines `a ⊕ (t ⊗ (⊖a ⊕ b))`.

use crate::algebra::GyrovectorAlgebra;
use crate::backend::Kernel;
use crate::error::{emit, Diagnostics, GyroError, GyroResult, InstabilityKind, NumericalInstabilityWarning};
use crate::guard::{ensure_finite, ensure_finite_scalar};
use crate::point::{Model, Point};
use crate::space::GyrovectorSpace;

#[derive(Debug, Clone, Copy)]
pub struct GeodesicSolver<'a> {
    space: &'a GyrovectorSpace,
    diagnostics: Option<&'a Diagnostics>,
}

impl<'a> GeodesicSolver<'a> {
    pub fn new(space: &'a GyrovectorSpace, diagnostics: Option<&'a Diagnostics>) -> Self {
        Self { space, diagnostics }
    }

    fn algebra(&self) -> GyrovectorAlgebra<'a> {
        GyrovectorAlgebra::new(self.space, self.diagnostics)
    }

    fn admit(&self, operation: &str, model: Model, points: &[&Point]) -> GyroResult<&'static dyn Kernel> {
        self.space
            .guard()
            .admit(operation, model, points, self.diagnostics)
    }

    /// Gyrodistance between two points of the same model.
    ///
    /// Klein and hyperboloid inputs are converted to the Poincare ball first.
    pub fn distance(&self, a: &Point, b: &Point) -> GyroResult<f64> {
        if a.model() != b.model() {
            return Err(GyroError::ModelMismatch {
                expected: a.model(),
                actual: b.model(),
            });
        }
        match a.model() {
            Model::Poincare => self.poincare_distance(a, b),
            _ => {
                let converter = self.space.converter();
                let a = converter.to_poincare(a)?;
                let b = converter.to_poincare(b)?;
                self.poincare_distance(&a, &b)
            }
        }
    }

    /// `(1/sqrt(c))·atanh(x)` with `x = sqrt(c)·||⊖a ⊕ b||`.
    ///
    /// Uses `||⊖a ⊕ b||² = ||a - b||² / D` and `1 - x² = g_a·g_b / D`,
    /// `D = 1 - 2c<a,b> + c²||a||²||b||²`, so that
    /// `atanh(x) = ln(1 + x) - ln(1 - x²)/2` keeps its precision near the
    /// boundary.
    fn poincare_distance(&self, a: &Point, b: &Point) -> GyroResult<f64> {
        let kernel = self.admit("distance", Model::Poincare, &[a, b])?;
        let c = self.space.c();
        let (u, v) = (a.coords(), b.coords());

        let diff_sq: f64 = u.iter().zip(v.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
        if diff_sq == 0.0 {
            return Ok(0.0);
        }
        let denom = 1.0 - 2.0 * c * kernel.dot(u, v) + c * c * kernel.norm_squared(u) * kernel.norm_squared(v);
        let x = (c * diff_sq / denom).sqrt();
        let one_minus_x_sq = kernel.conformal_gap(c, u) * kernel.conformal_gap(c, v) / denom;
        let atanh = x.ln_1p() - 0.5 * one_minus_x_sq.ln();

        ensure_finite_scalar("distance", atanh / self.space.sqrt_c())
    }

    /// Gyrodistance of two Klein points, from the arccosh form
    /// `cosh(sqrt(c)·d) = (1 - c<u,v>) / sqrt(g_u·g_v)` of the Riemannian
    /// distance d.
    pub fn klein_distance(&self, a: &Point, b: &Point) -> GyroResult<f64> {
        let kernel = self.admit("distance", Model::Klein, &[a, b])?;
        let c = self.space.c();
        let (u, v) = (a.coords(), b.coords());

        let diff_sq: f64 = u.iter().zip(v.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
        if diff_sq == 0.0 {
            return Ok(0.0);
        }
        // (1 - c<u,v>)² - g_u·g_v = c||u - v||² - c²||u ∧ v||²
        let mut wedge_sq = 0.0;
        for i in 0..u.len() {
            for j in (i + 1)..u.len() {
                let w = u[i] * v[j] - u[j] * v[i];
                wedge_sq += w * w;
            }
        }
        let numerator = (c * diff_sq - c * c * wedge_sq).max(0.0);
        let root = (kernel.conformal_gap(c, u) * kernel.conformal_gap(c, v)).sqrt();
        let y = numerator / (root * (1.0 - c * kernel.dot(u, v) + root));
        // arccosh(1 + y)
        let riemannian = (y + (y * (y + 2.0)).sqrt()).ln_1p();

        ensure_finite_scalar("distance", riemannian / (2.0 * self.space.sqrt_c()))
    }

    /// Gyrodistance of two hyperboloid points from their Minkowski chord
    /// `s² = Σ(xi - yi)² - (x0 - y0)²`: `asinh(sqrt(c)·s/2)/sqrt(c)`.
    pub fn hyperboloid_distance(&self, a: &Point, b: &Point) -> GyroResult<f64> {
        self.admit("distance", Model::Hyperboloid, &[a, b])?;
        let (x, y) = (a.coords(), b.coords());

        let time = x[0] - y[0];
        let space_sq: f64 = x[1..].iter().zip(y[1..].iter()).map(|(p, q)| (p - q) * (p - q)).sum();
        let chord = (space_sq - time * time).max(0.0).sqrt();
        let sqrt_c = self.space.sqrt_c();

        ensure_finite_scalar("distance", (sqrt_c * chord / 2.0).asinh() / sqrt_c)
    }

    /// Distance with the native formula of the points' model.
    pub fn native_distance(&self, a: &Point, b: &Point) -> GyroResult<f64> {
        if a.model() != b.model() {
            return Err(GyroError::ModelMismatch {
                expected: a.model(),
                actual: b.model(),
            });
        }
        match a.model() {
            Model::Poincare => self.poincare_distance(a, b),
            Model::Klein => self.klein_distance(a, b),
            Model::Hyperboloid => self.hyperboloid_distance(a, b),
        }
    }

    /// Point at parameter `t ∈ [0, 1]` on the geodesic from `a` to `b`.
    ///
    /// `t = 0` and `t = 1` return the endpoints exactly.
    ///
    /// # Errors
    /// `InvalidParameter` if `t` is non-finite or outside `[0, 1]`.
    pub fn geodesic(&self, a: &Point, b: &Point, t: f64) -> GyroResult<Point> {
        if !(t.is_finite() && (0.0..=1.0).contains(&t)) {
            return Err(GyroError::invalid_parameter(
                "t",
                format!("must be in [0, 1], got {t}"),
            ));
        }
        self.admit("geodesic", Model::Poincare, &[a, b])?;
        if t == 0.0 {
            return Ok(a.clone());
        }
        if t == 1.0 {
            return Ok(b.clone());
        }

        let algebra = self.algebra();
        let direction = algebra.add(&algebra.inverse(a)?, b)?;
        algebra.add(a, &algebra.scale(t, &direction)?)
    }

    /// Gyromidpoint `a ⊕_½ b`.
    pub fn midpoint(&self, a: &Point, b: &Point) -> GyroResult<Point> {
        self.geodesic(a, b, 0.5)
    }

    /// `steps + 1` evenly spaced points from `a` to `b`, endpoints exact.
    pub fn sample_geodesic(&self, a: &Point, b: &Point, steps: usize) -> GyroResult<Vec<Point>> {
        if steps == 0 {
            return Err(GyroError::invalid_parameter("steps", "must be >= 1"));
        }
        self.admit("geodesic", Model::Poincare, &[a, b])?;

        let algebra = self.algebra();
        let direction = algebra.add(&algebra.inverse(a)?, b)?;
        let mut samples = Vec::with_capacity(steps + 1);
        samples.push(a.clone());
        for i in 1..steps {
            let t = i as f64 / steps as f64;
            samples.push(algebra.add(a, &algebra.scale(t, &direction)?)?);
        }
        samples.push(b.clone());
        Ok(samples)
    }

    /// Conformal factor `λ_x = 2 / (1 - c||x||²)`.
    pub fn conformal_factor(&self, x: &Point) -> GyroResult<f64> {
        let kernel = self.admit("conformal_factor", Model::Poincare, &[x])?;
        Ok(2.0 / kernel.conformal_gap(self.space.c(), x.coords()))
    }

    /// Riemannian inner product `<u,v>_x = λ_x²<u,v>` of tangent vectors at x.
    pub fn inner_product_at(&self, x: &Point, u: &[f64], v: &[f64]) -> GyroResult<f64> {
        self.check_tangent("u", u)?;
        self.check_tangent("v", v)?;
        let lambda = self.conformal_factor(x)?;
        Ok(lambda * lambda * self.space.kernel().dot(u, v))
    }

    /// Transport tangent vector `w` at `a` along the geodesic to `b`:
    /// `(λ_a/λ_b)·gyr[b, ⊖a]w`.
    ///
    /// When a Lorentz factor exceeds `gamma_ceiling` the transport is
    /// computed on the extended kernel and a warning is recorded.
    pub fn parallel_transport(&self, w: &[f64], a: &Point, b: &Point) -> GyroResult<Vec<f64>> {
        self.check_tangent("w", w)?;
        let mut kernel = self.admit("parallel_transport", Model::Poincare, &[a, b])?;

        let guard = self.space.guard();
        let ceiling = self.space.config().gamma_ceiling;
        for point in [a, b] {
            let gamma = guard.lorentz_factor(point.coords());
            if gamma > ceiling {
                kernel = self.space.extended_kernel();
                emit(
                    self.diagnostics,
                    NumericalInstabilityWarning {
                        operation: "parallel_transport".to_string(),
                        kind: InstabilityKind::GammaCeiling { gamma, ceiling },
                        extended_precision: true,
                    },
                );
            }
        }

        let c = self.space.c();
        let ratio = kernel.conformal_gap(c, b.coords()) / kernel.conformal_gap(c, a.coords());
        let algebra = self.algebra();
        let rotated = algebra
            .gyration(b, &algebra.inverse(a)?)?
            .apply_vector_with(kernel, w)?;

        ensure_finite("parallel_transport", rotated.into_iter().map(|x| ratio * x).collect())
    }

    fn check_tangent(&self, name: &str, w: &[f64]) -> GyroResult<()> {
        if w.len() != self.space.dimension() {
            return Err(GyroError::DimensionMismatch {
                expected: self.space.dimension(),
                actual: w.len(),
            });
        }
        if !w.iter().all(|x| x.is_finite()) {
            return Err(GyroError::invalid_parameter(name, "tangent vector must be finite"));
        }
        Ok(())
    }
}
