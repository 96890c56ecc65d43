//! `ExactSymbolic` kernel.
//!
//! Every finite `f64` is a dyadic rational, and Mobius addition, inner
//! products and the conformal gap are rational functions of the inputs, so
//! they can be evaluated with no rounding at all over [`BigRational`] and
//! rounded to `f64` once. Non-finite inputs cannot be lifted; those fall
//! through to the compensated kernel, which propagates them as `f64` would.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use tracing::debug;

use super::compensated::CompensatedKernel;
use super::Kernel;
use crate::config::NumericBackend;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactKernel;

/// Lift a slice of doubles to exact rationals.
fn lift(values: &[f64]) -> Option<Vec<BigRational>> {
    values.iter().map(|x| BigRational::from_float(*x)).collect()
}

fn exact_dot(a: &[BigRational], b: &[BigRational]) -> BigRational {
    a.iter()
        .zip(b.iter())
        .fold(BigRational::zero(), |acc, (x, y)| acc + x * y)
}

/// Round an exact rational to the nearest double.
fn lower(value: &BigRational) -> Option<f64> {
    value.to_f64().filter(|x| x.is_finite())
}

impl ExactKernel {
    fn exact_mobius_add(c: f64, a: &[f64], b: &[f64]) -> Option<Vec<f64>> {
        let c = BigRational::from_float(c)?;
        let a = lift(a)?;
        let b = lift(b)?;

        let one = BigRational::one();
        let two = BigRational::from_integer(BigInt::from(2));
        let ab = exact_dot(&a, &b);
        let aa = exact_dot(&a, &a);
        let bb = exact_dot(&b, &b);

        let two_c_ab = &two * &c * &ab;
        let coeff_a = &one + &two_c_ab + &c * &bb;
        let coeff_b = &one - &c * &aa;
        let denom = &one + &two_c_ab + &c * &c * &aa * &bb;
        if denom.is_zero() {
            return None;
        }

        a.iter()
            .zip(b.iter())
            .map(|(ai, bi)| lower(&((&coeff_a * ai + &coeff_b * bi) / &denom)))
            .collect()
    }
}

impl Kernel for ExactKernel {
    fn backend(&self) -> NumericBackend {
        NumericBackend::ExactSymbolic
    }

    fn dot(&self, a: &[f64], b: &[f64]) -> f64 {
        lift(a)
            .zip(lift(b))
            .and_then(|(x, y)| lower(&exact_dot(&x, &y)))
            .unwrap_or_else(|| CompensatedKernel.dot(a, b))
    }

    fn conformal_gap(&self, c: f64, x: &[f64]) -> f64 {
        let exact = BigRational::from_float(c).zip(lift(x)).and_then(|(c, x)| {
            let gap = BigRational::one() - c * exact_dot(&x, &x);
            lower(&gap)
        });
        exact.unwrap_or_else(|| CompensatedKernel.conformal_gap(c, x))
    }

    fn mobius_add(&self, c: f64, a: &[f64], b: &[f64]) -> Vec<f64> {
        Self::exact_mobius_add(c, a, b).unwrap_or_else(|| {
            debug!("ExactKernel: inputs not representable exactly, using compensated path");
            CompensatedKernel.mobius_add(c, a, b)
        })
    }
}
