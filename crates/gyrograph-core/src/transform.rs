//! Mobius transformations `z ↦ (az + b) / (cz + d)` of the complex plane.
//!
//! In two dimensions the Poincare disk is the complex unit disk (radius
//! 1/sqrt(c)) and Mobius addition is itself a Mobius transformation:
//! `a ⊕ z = (z + a) / (1 + c·conj(a)·z)`. The orientation-preserving
//! isometries of the disk are the [`disk_automorphism`](Transformation::disk_automorphism)s
//! `e^{iθ}(z + a) / (1 + conj(a)·z)`.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{GyroError, GyroResult};
use crate::point::{Model, Point};
use crate::space::GyrovectorSpace;

/// `|ad - bc|` at or below this is rejected as degenerate.
pub const DEGENERATE_EPSILON: f64 = 1e-15;

/// Mobius transformation with `ad - bc != 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransformationRepr")]
pub struct Transformation {
    a: Complex64,
    b: Complex64,
    c: Complex64,
    d: Complex64,
}

/// Deserialized coefficients, checked by [`Transformation::new`].
#[derive(Deserialize)]
struct TransformationRepr {
    a: Complex64,
    b: Complex64,
    c: Complex64,
    d: Complex64,
}

impl TryFrom<TransformationRepr> for Transformation {
    type Error = GyroError;

    fn try_from(repr: TransformationRepr) -> GyroResult<Self> {
        Self::new(repr.a, repr.b, repr.c, repr.d)
    }
}

impl Transformation {
    /// # Errors
    /// - `InvalidParameter` if a coefficient is not finite
    /// - `DegenerateTransformation` if `|ad - bc| <= DEGENERATE_EPSILON`
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> GyroResult<Self> {
        if ![a, b, c, d].iter().all(|z| z.is_finite()) {
            return Err(GyroError::invalid_parameter(
                "transformation",
                "coefficients must be finite",
            ));
        }
        let transformation = Self { a, b, c, d };
        let determinant = transformation.determinant().norm();
        if determinant <= DEGENERATE_EPSILON {
            return Err(GyroError::DegenerateTransformation { determinant });
        }
        Ok(transformation)
    }

    /// Build from eight reals `[a.re, a.im, b.re, b.im, c.re, c.im, d.re, d.im]`.
    pub fn from_components(values: &[f64]) -> GyroResult<Self> {
        match values {
            [ar, ai, br, bi, cr, ci, dr, di] => Self::new(
                Complex64::new(*ar, *ai),
                Complex64::new(*br, *bi),
                Complex64::new(*cr, *ci),
                Complex64::new(*dr, *di),
            ),
            _ => Err(GyroError::invalid_parameter(
                "transformation",
                format!("expected 8 components, got {}", values.len()),
            )),
        }
    }

    pub fn components(&self) -> [f64; 8] {
        [
            self.a.re, self.a.im, self.b.re, self.b.im, self.c.re, self.c.im, self.d.re, self.d.im,
        ]
    }

    pub fn identity() -> Self {
        Self {
            a: Complex64::new(1.0, 0.0),
            b: Complex64::new(0.0, 0.0),
            c: Complex64::new(0.0, 0.0),
            d: Complex64::new(1.0, 0.0),
        }
    }

    /// `e^{iθ}(z + a) / (1 + conj(a)·z)` for `|a| < 1`.
    pub fn disk_automorphism(theta: f64, a: Complex64) -> GyroResult<Self> {
        if !theta.is_finite() {
            return Err(GyroError::invalid_parameter("theta", "must be finite"));
        }
        if !(a.norm() < 1.0) {
            return Err(GyroError::invalid_parameter(
                "a",
                format!("must lie in the unit disk, |a| = {}", a.norm()),
            ));
        }
        let rotation = Complex64::from_polar(1.0, theta);
        Self::new(rotation, rotation * a, a.conj(), Complex64::new(1.0, 0.0))
    }

    /// Left gyrotranslation `z ↦ a ⊕ z` of the disk of curvature -c.
    pub fn gyro_translation(space: &GyrovectorSpace, a: &Point) -> GyroResult<Self> {
        let a = planar(space, a)?;
        Self::new(
            Complex64::new(1.0, 0.0),
            a,
            a.conj() * space.c(),
            Complex64::new(1.0, 0.0),
        )
    }

    #[inline]
    pub fn determinant(&self) -> Complex64 {
        self.a * self.d - self.b * self.c
    }

    /// `(az + b) / (cz + d)`.
    ///
    /// # Errors
    /// `InvalidParameter` at the pole `cz + d = 0`.
    pub fn apply(&self, z: Complex64) -> GyroResult<Complex64> {
        let denominator = self.c * z + self.d;
        let scale = (self.c * z).norm().max(self.d.norm());
        if denominator.norm() <= DEGENERATE_EPSILON * scale.max(1.0) {
            return Err(GyroError::invalid_parameter(
                "z",
                format!("{z} is the pole of the transformation"),
            ));
        }
        Ok((self.a * z + self.b) / denominator)
    }

    /// `self ∘ other`: apply `other` first.
    pub fn compose(&self, other: &Transformation) -> Transformation {
        Transformation {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
        }
    }

    pub fn inverse(&self) -> Transformation {
        Transformation {
            a: self.d,
            b: -self.b,
            c: -self.c,
            d: self.a,
        }
    }

    /// Same map with coefficients scaled so that `ad - bc = 1`.
    pub fn normalized(&self) -> Transformation {
        let root = self.determinant().sqrt();
        Transformation {
            a: self.a / root,
            b: self.b / root,
            c: self.c / root,
            d: self.d / root,
        }
    }

    /// Apply to a 2-D Poincare point; the image must lie in the disk.
    pub fn apply_point(&self, space: &GyrovectorSpace, point: &Point) -> GyroResult<Point> {
        let z = planar(space, point)?;
        let image = self.apply(z)?;
        let result = Point::poincare(vec![image.re, image.im]);
        space.guard().check(&result)?;
        Ok(result)
    }
}

/// A validated 2-D Poincare point as a complex number.
fn planar(space: &GyrovectorSpace, point: &Point) -> GyroResult<Complex64> {
    if point.coords().len() != 2 {
        return Err(GyroError::DimensionMismatch {
            expected: 2,
            actual: point.coords().len(),
        });
    }
    space.guard().validate(point, Model::Poincare)?;
    Ok(Complex64::new(point.coords()[0], point.coords()[1]))
}
