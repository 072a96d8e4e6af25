//! Small dense-matrix helpers over `ndarray` used by the cost functions and equivalence checks.

use ndarray::{Array, Array2, ArrayBase, Data, Dimension, Zip};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Relative and absolute tolerance for element-wise comparisons, `|a - b| <= atol + rtol * |b|`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|x| x.conj())
}

/// Sum of the diagonal.
pub fn trace(m: &Array2<Complex64>) -> Complex64 {
    m.diag().iter().sum()
}

/// Identity matrix of size `d`.
pub fn identity(d: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(d, Complex64::new(1.0, 0.0))
}

/// Frobenius norm, the square root of the summed squared magnitudes.
pub fn frobenius<S, D>(m: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    m.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
}

/// Element-wise closeness of two equally shaped arrays.
pub fn allclose<S, D>(a: &ArrayBase<S, D>, b: &ArrayBase<S, D>, tol: Tolerance) -> bool
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    a.shape() == b.shape()
        && Zip::from(a)
            .and(b)
            .all(|x, y| (x - y).norm() <= tol.atol + tol.rtol * y.norm())
}

/// Compare two arrays, optionally ignoring a global phase. When ignoring phase each operand is
/// rotated so that its first entry with magnitude above `atol` is real and positive.
pub fn matrix_equal<S, D>(
    a: &ArrayBase<S, D>,
    b: &ArrayBase<S, D>,
    ignore_phase: bool,
    tol: Tolerance,
) -> bool
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    if a.shape() != b.shape() {
        return false;
    }
    if ignore_phase {
        let a = remove_phase(a, tol.atol);
        let b = remove_phase(b, tol.atol);
        allclose(&a, &b, tol)
    } else {
        allclose(a, b, tol)
    }
}

fn remove_phase<S, D>(m: &ArrayBase<S, D>, atol: f64) -> Array<Complex64, D>
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    let phase = m
        .iter()
        .find(|x| x.norm() > atol)
        .map(|x| x.arg())
        .unwrap_or(0.0);
    let rot = Complex64::from_polar(1.0, -phase);
    m.mapv(|x| x * rot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_trace_and_dagger() {
        let m = arr2(&[[c(1.0, 1.0), c(0.0, 2.0)], [c(3.0, 0.0), c(4.0, -1.0)]]);
        assert_eq!(trace(&m), c(5.0, 0.0));
        let d = dagger(&m);
        assert_eq!(d[[0, 1]], c(3.0, 0.0));
        assert_eq!(d[[1, 0]], c(0.0, -2.0));
    }

    #[test]
    fn test_frobenius() {
        let m = arr2(&[[c(3.0, 0.0), c(0.0, 4.0)], [c(0.0, 0.0), c(0.0, 0.0)]]);
        assert!((frobenius(&m) - 5.0).abs() < 1e-12);
        assert_eq!(frobenius(&identity(4)), 2.0);
    }

    #[test]
    fn test_phase_is_ignored_only_when_asked() {
        let a = arr1(&[c(0.0, 0.0), c(1.0, 0.0)]);
        let b = arr1(&[c(0.0, 0.0), c(0.0, 1.0)]);
        assert!(!matrix_equal(&a, &b, false, Tolerance::default()));
        assert!(matrix_equal(&a, &b, true, Tolerance::default()));
    }

    #[test]
    fn test_shape_mismatch_is_unequal() {
        let a = identity(2);
        let b = identity(4);
        assert!(!matrix_equal(&a, &b, true, Tolerance::default()));
        assert!(!allclose(&a, &b, Tolerance::default()));
    }
}
