//! Arithmetic kernels behind [`NumericBackend`].
//!
//! Only the precision-sensitive primitives go through a kernel:
//! - inner products
//! - the conformal gap `1 - c·||x||²` (vanishes at the boundary)
//! - Mobius addition (a rational function of the coordinates)
//!
//! Everything else in the algebra is plain `f64`.
//!
//! ## Module Structure
//!
//! - [`double_double`]: error-free transformations and the `DoubleDouble` type
//! - [`compensated`]: `MultiPrecision` kernel
//! - [`exact`]: `ExactSymbolic` kernel over `BigRational`

pub mod compensated;
pub mod double_double;
pub mod exact;

use crate::config::NumericBackend;

pub use compensated::CompensatedKernel;
pub use double_double::DoubleDouble;
pub use exact::ExactKernel;

/// Precision-sensitive primitives, one implementation per backend.
pub trait Kernel: Send + Sync {
    /// Backend this kernel implements.
    fn backend(&self) -> NumericBackend;

    /// Euclidean inner product.
    fn dot(&self, a: &[f64], b: &[f64]) -> f64;

    /// `1 - c·||x||²`.
    fn conformal_gap(&self, c: f64, x: &[f64]) -> f64;

    /// Mobius addition in the ball of curvature -c:
    ///
    /// ```text
    /// a ⊕ b = ((1 + 2c<a,b> + c||b||²)a + (1 - c||a||²)b) / (1 + 2c<a,b> + c²||a||²||b||²)
    /// ```
    fn mobius_add(&self, c: f64, a: &[f64], b: &[f64]) -> Vec<f64>;

    #[inline]
    fn norm_squared(&self, x: &[f64]) -> f64 {
        self.dot(x, x)
    }
}

/// Plain `f64` kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastKernel;

impl Kernel for FastKernel {
    fn backend(&self) -> NumericBackend {
        NumericBackend::FastFloat
    }

    #[inline]
    fn dot(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[inline]
    fn conformal_gap(&self, c: f64, x: &[f64]) -> f64 {
        1.0 - c * self.norm_squared(x)
    }

    fn mobius_add(&self, c: f64, a: &[f64], b: &[f64]) -> Vec<f64> {
        let ab = self.dot(a, b);
        let aa = self.norm_squared(a);
        let bb = self.norm_squared(b);

        let coeff_a = 1.0 + 2.0 * c * ab + c * bb;
        let coeff_b = 1.0 - c * aa;
        let denom = 1.0 + 2.0 * c * ab + c * c * aa * bb;

        a.iter()
            .zip(b.iter())
            .map(|(ai, bi)| (coeff_a * ai + coeff_b * bi) / denom)
            .collect()
    }
}

impl NumericBackend {
    /// Kernel implementing this backend.
    pub fn kernel(self) -> &'static dyn Kernel {
        match self {
            NumericBackend::FastFloat => &FastKernel,
            NumericBackend::MultiPrecision => &CompensatedKernel,
            NumericBackend::ExactSymbolic => &ExactKernel,
        }
    }
}
