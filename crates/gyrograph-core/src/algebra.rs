//! Gyrovector algebra of the Poincare ball.
//!
//! With c = -κ > 0 the ball of radius 1/sqrt(c) is a gyrocommutative
//! gyrogroup under Mobius addition:
//!
//! ```text
//! a ⊕ b      = ((1 + 2c<a,b> + c||b||²)a + (1 - c||a||²)b) / (1 + 2c<a,b> + c²||a||²||b||²)
//! r ⊗ a      = tanh(r·atanh(sqrt(c)||a||)) · a / (sqrt(c)||a||)
//! gyr[a,b]w  = ⊖(a ⊕ b) ⊕ (a ⊕ (b ⊕ w))
//! ```
//!
//! Every operation admits its inputs through the guard. Inputs near the
//! boundary switch the computation to the extended kernel and raise a
//! [`NumericalInstabilityWarning`].

use tracing::debug;

use crate::backend::{CompensatedKernel, Kernel};
use crate::config::NumericBackend;
use crate::error::{emit, Diagnostics, GyroError, GyroResult, InstabilityKind, NumericalInstabilityWarning};
use crate::guard::{ensure_finite, StabilityGuard};
use crate::point::{Model, Point};
use crate::space::GyrovectorSpace;

/// Ball-model gyrovector operations bound to a space.
#[derive(Debug, Clone, Copy)]
pub struct GyrovectorAlgebra<'a> {
    space: &'a GyrovectorSpace,
    diagnostics: Option<&'a Diagnostics>,
}

impl<'a> GyrovectorAlgebra<'a> {
    pub fn new(space: &'a GyrovectorSpace, diagnostics: Option<&'a Diagnostics>) -> Self {
        Self { space, diagnostics }
    }

    pub fn space(&self) -> &'a GyrovectorSpace {
        self.space
    }

    fn guard(&self) -> StabilityGuard<'a> {
        self.space.guard()
    }

    fn admit(&self, operation: &str, points: &[&Point]) -> GyroResult<&'static dyn Kernel> {
        self.guard()
            .admit(operation, Model::Poincare, points, self.diagnostics)
    }

    /// The gyrogroup identity (the origin).
    pub fn identity(&self) -> Point {
        self.space.origin(Model::Poincare)
    }

    /// Mobius addition `a ⊕ b`.
    ///
    /// # Errors
    /// - `Domain` if either input is outside the ball
    /// - `ModelMismatch` / `DimensionMismatch` for non-Poincare or
    ///   wrongly-sized inputs
    pub fn add(&self, a: &Point, b: &Point) -> GyroResult<Point> {
        let kernel = self.admit("add", &[a, b])?;
        let coords = self.mobius(kernel, "add", a.coords(), b.coords())?;
        Ok(a.with_coords(coords))
    }

    /// Gyrogroup inverse `⊖a = -a`.
    pub fn inverse(&self, a: &Point) -> GyroResult<Point> {
        self.admit("inverse", &[a])?;
        Ok(a.with_coords(a.coords().iter().map(|x| -x).collect()))
    }

    /// Gyroscalar multiplication `r ⊗ a`.
    ///
    /// # Errors
    /// `InvalidParameter` if `r` is not finite, plus the domain errors of
    /// [`add`](Self::add).
    pub fn scale(&self, r: f64, a: &Point) -> GyroResult<Point> {
        if !r.is_finite() {
            return Err(GyroError::invalid_parameter("r", format!("must be finite, got {r}")));
        }
        let kernel = self.admit("scale", &[a])?;
        let coords = self.scale_coords(kernel, r, a.coords())?;
        Ok(a.with_coords(coords))
    }

    /// Gyration `gyr[a,b]` as a callable automorphism.
    pub fn gyration(&self, a: &Point, b: &Point) -> GyroResult<Gyration<'a>> {
        self.admit("gyration", &[a, b])?;
        Ok(Gyration {
            algebra: *self,
            a: a.clone(),
            b: b.clone(),
        })
    }

    /// Gyrogroup cooperation `a ⊞ b = a ⊕ gyr[a,⊖b]b`.
    pub fn coadd(&self, a: &Point, b: &Point) -> GyroResult<Point> {
        let neg_b = self.inverse(b)?;
        let corrected = self.gyration(a, &neg_b)?.apply(b)?;
        self.add(a, &corrected)
    }

    /// Mobius addition on validated coordinates, with boundary handling.
    fn mobius(
        &self,
        kernel: &'static dyn Kernel,
        operation: &str,
        a: &[f64],
        b: &[f64],
    ) -> GyroResult<Vec<f64>> {
        let c = self.space.c();
        let mut sum = ensure_finite(operation, kernel.mobius_add(c, a, b))?;

        let extended = self.space.extended_kernel();
        if !strictly_inside(c, &sum) && kernel.backend() != extended.backend() {
            debug!(
                operation,
                from = %kernel.backend(),
                to = %extended.backend(),
                "Sum rounded onto the boundary, recomputing with extended kernel"
            );
            sum = ensure_finite(operation, extended.mobius_add(c, a, b))?;
        }

        Ok(self.contain(operation, sum, true, false))
    }

    fn scale_coords(&self, kernel: &'static dyn Kernel, r: f64, a: &[f64]) -> GyroResult<Vec<f64>> {
        let norm = kernel.norm_squared(a).sqrt();
        if norm == 0.0 {
            return Ok(vec![0.0; a.len()]);
        }
        if norm < self.space.epsilon() {
            // tanh(r·atanh(x))/x -> r as x -> 0
            return ensure_finite("scale", a.iter().map(|x| r * x).collect());
        }

        let x = self.space.sqrt_c() * norm;
        let gap = kernel.conformal_gap(self.space.c(), a);
        // atanh(x) = ln(1 + x) - ln(1 - x²)/2, with 1 - x² taken from the kernel
        let atanh = x.ln_1p() - 0.5 * gap.ln();
        let t = (r * atanh).tanh();
        let scaled = ensure_finite("scale", a.iter().map(|ai| (t / x) * ai).collect())?;

        // tanh saturated at ±1: the result is only as far inside as rounding allows
        let saturated = t.abs() >= 1.0;
        let extended = kernel.backend() != NumericBackend::FastFloat;
        Ok(self.contain("scale", scaled, extended, saturated))
    }

    /// Project a result back inside the ball if it rounded out, warning
    /// when that happens or when the caller already lost the radius.
    fn contain(&self, operation: &str, coords: Vec<f64>, extended: bool, saturated: bool) -> Vec<f64> {
        let norm = coords.iter().map(|x| x * x).sum::<f64>().sqrt();
        let (coords, projected) = self.guard().contain(coords);
        if projected || saturated {
            emit(
                self.diagnostics,
                NumericalInstabilityWarning {
                    operation: operation.to_string(),
                    kind: InstabilityKind::BoundaryProjection { norm },
                    extended_precision: extended,
                },
            );
        }
        coords
    }
}

fn strictly_inside(c: f64, coords: &[f64]) -> bool {
    CompensatedKernel::conformal_gap_dd(c, coords).to_f64() > 0.0
}

/// The automorphism `gyr[a,b]` of the ball.
///
/// [`apply`](Self::apply) evaluates the defining composition of Mobius
/// additions on a point. [`apply_vector`](Self::apply_vector) evaluates the
/// equivalent closed form, which is linear and therefore also acts on
/// tangent vectors of any length:
///
/// ```text
/// gyr[u,v]w = w + 2(A·u + B·v)/D
/// A = -c²<u,w>||v||² + c<v,w> + 2c²<u,v><v,w>
/// B = -c²<v,w>||u||² - c<u,w>
/// D = 1 + 2c<u,v> + c²||u||²||v||²
/// ```
#[derive(Debug, Clone)]
pub struct Gyration<'a> {
    algebra: GyrovectorAlgebra<'a>,
    a: Point,
    b: Point,
}

impl<'a> Gyration<'a> {
    pub fn a(&self) -> &Point {
        &self.a
    }

    pub fn b(&self) -> &Point {
        &self.b
    }

    /// `⊖(a ⊕ b) ⊕ (a ⊕ (b ⊕ w))`.
    pub fn apply(&self, w: &Point) -> GyroResult<Point> {
        let algebra = &self.algebra;
        let ab = algebra.add(&self.a, &self.b)?;
        let bw = algebra.add(&self.b, w)?;
        let a_bw = algebra.add(&self.a, &bw)?;
        algebra.add(&algebra.inverse(&ab)?, &a_bw)
    }

    /// Closed-form action on an arbitrary vector of the ball's dimension.
    pub fn apply_vector(&self, w: &[f64]) -> GyroResult<Vec<f64>> {
        self.apply_vector_with(self.algebra.space.kernel(), w)
    }

    pub(crate) fn apply_vector_with(&self, kernel: &dyn Kernel, w: &[f64]) -> GyroResult<Vec<f64>> {
        let space = self.algebra.space;
        if w.len() != space.dimension() {
            return Err(GyroError::DimensionMismatch {
                expected: space.dimension(),
                actual: w.len(),
            });
        }
        if !w.iter().all(|x| x.is_finite()) {
            return Err(GyroError::invalid_parameter("w", "vector must be finite"));
        }

        let c = space.c();
        let (u, v) = (self.a.coords(), self.b.coords());
        let uu = kernel.norm_squared(u);
        let vv = kernel.norm_squared(v);
        let uv = kernel.dot(u, v);
        let uw = kernel.dot(u, w);
        let vw = kernel.dot(v, w);

        let coeff_u = -c * c * uw * vv + c * vw + 2.0 * c * c * uv * vw;
        let coeff_v = -c * c * vw * uu - c * uw;
        let denom = 1.0 + 2.0 * c * uv + c * c * uu * vv;

        ensure_finite(
            "gyration",
            w.iter()
                .zip(u.iter().zip(v.iter()))
                .map(|(wi, (ui, vi))| wi + 2.0 * (coeff_u * ui + coeff_v * vi) / denom)
                .collect(),
        )
    }

    /// `gyr[a,b]⁻¹ = gyr[b,a]`.
    pub fn inverse(&self) -> Gyration<'a> {
        Gyration {
            algebra: self.algebra,
            a: self.b.clone(),
            b: self.a.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpaceConfig;

    fn norm(v: &[f64]) -> f64 {
        v.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (x, y)) in actual.iter().zip(expected.iter()).enumerate() {
            assert!((x - y).abs() <= tol, "coord {i}: {x} vs {y} (tol {tol})");
        }
    }

    #[test]
    fn test_add_known_value() {
        let space = GyrovectorSpace::default();
        let a = Point::poincare(vec![0.3, 0.4, 0.0]);
        let b = Point::poincare(vec![0.1, 0.2, 0.5]);

        let sum = space.algebra().add(&a, &b).unwrap();

        // <a,b> = 0.11, ||a||² = 0.25, ||b||² = 0.30
        let denom = 1.295;
        let expected = [0.531 / denom, 0.758 / denom, 0.375 / denom];
        assert_close(sum.coords(), &expected, 1e-10);
        assert!(norm(sum.coords()) < 1.0);
    }

    #[test]
    fn test_add_reduces_to_complex_formula_in_plane() {
        // (a + b) / (1 + conj(a)·b) for a = 0.5, b = 0.5i
        let space = GyrovectorSpace::with_curvature(-1.0, 2).unwrap();
        let a = Point::poincare(vec![0.5, 0.0]);
        let b = Point::poincare(vec![0.0, 0.5]);
        let sum = space.algebra().add(&a, &b).unwrap();

        let numerator = num_complex::Complex64::new(0.5, 0.5);
        let denominator = num_complex::Complex64::new(1.0, 0.25);
        let expected = numerator / denominator;
        assert_close(sum.coords(), &[expected.re, expected.im], 1e-14);
    }

    #[test]
    fn test_identity_and_inverse() {
        let space = GyrovectorSpace::default();
        let algebra = space.algebra();
        let a = Point::poincare(vec![0.2, -0.6, 0.1]);

        let right = algebra.add(&a, &algebra.identity()).unwrap();
        let left = algebra.add(&algebra.identity(), &a).unwrap();
        assert_close(right.coords(), a.coords(), 1e-12);
        assert_close(left.coords(), a.coords(), 1e-12);

        let zero = algebra.add(&a, &algebra.inverse(&a).unwrap()).unwrap();
        assert_close(zero.coords(), &[0.0; 3], 1e-15);
    }

    #[test]
    fn test_add_rejects_outside_point() {
        let space = GyrovectorSpace::default();
        let a = Point::poincare(vec![0.9, 0.9, 0.0]);
        let b = Point::poincare(vec![0.1, 0.0, 0.0]);
        let err = space.algebra().add(&a, &b).unwrap_err();
        assert!(err.is_domain_violation());
    }

    #[test]
    fn test_add_rejects_mixed_models() {
        let space = GyrovectorSpace::default();
        let a = Point::poincare(vec![0.1, 0.0, 0.0]);
        let b = Point::klein(vec![0.1, 0.0, 0.0]);
        assert!(matches!(
            space.algebra().add(&a, &b),
            Err(GyroError::ModelMismatch { .. })
        ));
    }

    #[test]
    fn test_scale_known_value() {
        let space = GyrovectorSpace::default();
        let u = Point::poincare(vec![0.1, 0.2, 0.3]);
        let scaled = space.algebra().scale(2.0, &u).unwrap();

        let n = norm(u.coords());
        let factor = (2.0 * n.atanh()).tanh() / n;
        let expected: Vec<f64> = u.coords().iter().map(|x| x * factor).collect();
        assert_close(scaled.coords(), &expected, 1e-12);
        assert!(norm(scaled.coords()) < 1.0);
    }

    #[test]
    fn test_scale_by_one_and_minus_one() {
        let space = GyrovectorSpace::default();
        let algebra = space.algebra();
        let u = Point::poincare(vec![0.4, -0.3, 0.2]);

        assert_close(algebra.scale(1.0, &u).unwrap().coords(), u.coords(), 1e-14);
        assert_close(
            algebra.scale(-1.0, &u).unwrap().coords(),
            algebra.inverse(&u).unwrap().coords(),
            1e-14,
        );
        assert_eq!(algebra.scale(5.0, &algebra.identity()).unwrap(), algebra.identity());
    }

    #[test]
    fn test_scale_is_distributive_over_scalar_addition() {
        // (r1 + r2) ⊗ a = r1 ⊗ a ⊕ r2 ⊗ a
        let space = GyrovectorSpace::default();
        let algebra = space.algebra();
        let a = Point::poincare(vec![0.3, 0.1, -0.2]);

        let lhs = algebra.scale(1.75, &a).unwrap();
        let rhs = algebra
            .add(&algebra.scale(0.5, &a).unwrap(), &algebra.scale(1.25, &a).unwrap())
            .unwrap();
        assert_close(lhs.coords(), rhs.coords(), 1e-12);
    }

    #[test]
    fn test_scale_rejects_non_finite_scalar() {
        let space = GyrovectorSpace::default();
        let u = Point::poincare(vec![0.1, 0.2, 0.3]);
        assert!(matches!(
            space.algebra().scale(f64::NAN, &u),
            Err(GyroError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_scale_saturation_stays_inside_with_warning() {
        let space = GyrovectorSpace::default();
        let diag = Diagnostics::new();
        let u = Point::poincare(vec![0.9, 0.0, 0.0]);

        let scaled = space.algebra_with(&diag).scale(1e3, &u).unwrap();

        assert!(space.guard().check(&scaled).is_ok());
        assert!(diag
            .warnings()
            .iter()
            .any(|w| matches!(w.kind, InstabilityKind::BoundaryProjection { .. })));
    }

    #[test]
    fn test_scale_with_curvature() {
        let space = GyrovectorSpace::with_curvature(-4.0, 1).unwrap();
        let u = Point::poincare(vec![0.2]);
        let scaled = space.algebra().scale(3.0, &u).unwrap();
        // sqrt(c)·||r ⊗ u|| = tanh(3·atanh(0.4))
        let expected = (3.0 * 0.4f64.atanh()).tanh() / 2.0;
        assert!((scaled.coords()[0] - expected).abs() < 1e-14);
    }

    #[test]
    fn test_gyration_closed_form_matches_definition() {
        let space = GyrovectorSpace::default();
        let algebra = space.algebra();
        let a = Point::poincare(vec![0.3, 0.4, 0.0]);
        let b = Point::poincare(vec![-0.1, 0.2, 0.5]);
        let w = Point::poincare(vec![0.2, -0.3, 0.1]);

        let gyr = algebra.gyration(&a, &b).unwrap();
        let by_definition = gyr.apply(&w).unwrap();
        let closed = gyr.apply_vector(w.coords()).unwrap();

        assert_close(by_definition.coords(), &closed, 1e-12);
        assert!((norm(&closed) - norm(w.coords())).abs() < 1e-12);
    }

    #[test]
    fn test_gyration_inverse_undoes_gyration() {
        let space = GyrovectorSpace::default();
        let algebra = space.algebra();
        let a = Point::poincare(vec![0.5, 0.1, 0.0]);
        let b = Point::poincare(vec![0.0, -0.4, 0.3]);
        let w = [1.0, 2.0, -3.0];

        let gyr = algebra.gyration(&a, &b).unwrap();
        let back = gyr.inverse().apply_vector(&gyr.apply_vector(&w).unwrap()).unwrap();
        assert_close(&back, &w, 1e-12);
    }

    #[test]
    fn test_gyration_of_parallel_points_is_trivial() {
        let space = GyrovectorSpace::default();
        let algebra = space.algebra();
        let a = Point::poincare(vec![0.2, 0.0, 0.0]);
        let b = Point::poincare(vec![0.6, 0.0, 0.0]);
        let w = [0.1, 0.7, -0.2];

        let rotated = algebra.gyration(&a, &b).unwrap().apply_vector(&w).unwrap();
        assert_close(&rotated, &w, 1e-15);
    }

    #[test]
    fn test_coadd_with_inverse_is_identity() {
        // a ⊞ (⊖a) = 0
        let space = GyrovectorSpace::default();
        let algebra = space.algebra();
        let a = Point::poincare(vec![0.3, -0.2, 0.4]);
        let zero = algebra.coadd(&a, &algebra.inverse(&a).unwrap()).unwrap();
        assert_close(zero.coords(), &[0.0; 3], 1e-12);
    }

    #[test]
    fn test_coadd_is_commutative() {
        let space = GyrovectorSpace::default();
        let algebra = space.algebra();
        let a = Point::poincare(vec![0.3, 0.1, 0.0]);
        let b = Point::poincare(vec![-0.2, 0.4, 0.1]);
        let ab = algebra.coadd(&a, &b).unwrap();
        let ba = algebra.coadd(&b, &a).unwrap();
        assert_close(ab.coords(), ba.coords(), 1e-12);
    }

    #[test]
    fn test_near_boundary_add_uses_extended_kernel() {
        let space = GyrovectorSpace::default();
        let diag = Diagnostics::new();
        let a = Point::poincare(vec![1.0 - 1e-14, 0.0, 0.0]);
        let b = Point::poincare(vec![0.0, 0.3, 0.0]);

        let sum = space.algebra_with(&diag).add(&a, &b).unwrap();

        assert!(space.guard().check(&sum).is_ok());
        let warnings = diag.warnings();
        assert!(!warnings.is_empty());
        assert!(matches!(warnings[0].kind, InstabilityKind::NearBoundary { .. }));
        assert!(warnings[0].extended_precision);
    }

    #[test]
    fn test_backends_agree_on_interior_sum() {
        let a = Point::poincare(vec![0.3, 0.4, 0.0]);
        let b = Point::poincare(vec![0.1, 0.2, 0.5]);
        let reference = GyrovectorSpace::default().algebra().add(&a, &b).unwrap();

        for backend in [NumericBackend::MultiPrecision, NumericBackend::ExactSymbolic] {
            let space = GyrovectorSpace::new(SpaceConfig {
                backend,
                ..SpaceConfig::default()
            })
            .unwrap();
            let sum = space.algebra().add(&a, &b).unwrap();
            assert_close(sum.coords(), reference.coords(), 1e-12);
        }
    }
}
