//! `MultiPrecision` kernel: every primitive evaluated in double-double and
//! rounded once at the end.

use super::double_double::DoubleDouble;
use super::Kernel;
use crate::config::NumericBackend;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompensatedKernel;

impl CompensatedKernel {
    /// `1 - c·||x||²` kept in double-double.
    pub fn conformal_gap_dd(c: f64, x: &[f64]) -> DoubleDouble {
        DoubleDouble::ONE - DoubleDouble::dot(x, x).mul_f64(c)
    }
}

impl Kernel for CompensatedKernel {
    fn backend(&self) -> NumericBackend {
        NumericBackend::MultiPrecision
    }

    fn dot(&self, a: &[f64], b: &[f64]) -> f64 {
        DoubleDouble::dot(a, b).to_f64()
    }

    fn conformal_gap(&self, c: f64, x: &[f64]) -> f64 {
        Self::conformal_gap_dd(c, x).to_f64()
    }

    fn mobius_add(&self, c: f64, a: &[f64], b: &[f64]) -> Vec<f64> {
        let c_dd = DoubleDouble::from_f64(c);
        let ab = DoubleDouble::dot(a, b);
        let aa = DoubleDouble::dot(a, a);
        let bb = DoubleDouble::dot(b, b);

        let two_c_ab = ab.mul_f64(2.0 * c);
        let coeff_a = DoubleDouble::ONE + two_c_ab + bb * c_dd;
        let coeff_b = DoubleDouble::ONE - aa * c_dd;
        let denom = DoubleDouble::ONE + two_c_ab + aa * bb * c_dd * c_dd;

        a.iter()
            .zip(b.iter())
            .map(|(ai, bi)| {
                let numer = coeff_a.mul_f64(*ai) + coeff_b.mul_f64(*bi);
                (numer / denom).to_f64()
            })
            .collect()
    }
}
