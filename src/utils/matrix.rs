//! Matrix utility functions.
//!
//! The normal-equation solvers only invert symmetric positive semi-definite
//! matrices. The pseudo-inverse and the numerical rank both come from faer's
//! self-adjoint eigendecomposition with a relative eigenvalue cut-off.

use crate::solvers::RegressionError;
use faer::{Col, Mat, Side};

/// Detect columns that are constant and non-zero (intercept-like columns).
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_cols = x.ncols();
    let n_rows = x.nrows();

    if n_rows == 0 {
        return vec![false; n_cols];
    }

    let mut constant = vec![false; n_cols];

    for j in 0..n_cols {
        let first = x[(0, j)];
        let all_same = (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance);
        constant[j] = all_same && first != 0.0;
    }

    constant
}

/// Identity matrix of size `n`.
pub fn identity(n: usize) -> Mat<f64> {
    Mat::identity(n, n)
}

/// Sandwich product `A B A` for symmetric `A`.
pub fn sandwich(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let ab = a * b;
    symmetrize(&(&ab * a))
}

/// Quadratic form `v' A v`.
pub fn quad_form(a: &Mat<f64>, v: &Col<f64>) -> f64 {
    let av = a * v;
    (0..v.nrows()).map(|i| v[i] * av[i]).sum()
}

/// Average a matrix with its transpose to remove rounding asymmetry.
pub fn symmetrize(a: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| 0.5 * (a[(i, j)] + a[(j, i)]))
}

/// Eigendecomposition of a symmetric matrix, read from the lower triangle.
///
/// Returns the eigenvalues in nondecreasing order and the matrix whose
/// columns are the matching orthonormal eigenvectors.
pub fn symmetric_eigen(a: &Mat<f64>) -> Result<(Col<f64>, Mat<f64>), RegressionError> {
    let evd = a.self_adjoint_eigen(Side::Lower).map_err(|err| {
        RegressionError::NumericalError(format!("eigendecomposition failed: {err:?}"))
    })?;
    let s = evd.S();
    let values = Col::from_fn(a.nrows(), |i| s[i]);
    Ok((values, evd.U().to_owned()))
}

/// Eigenvalues above `rcond * max|λ|` are kept, everything else counts as zero.
fn eigen_cutoff(eigenvalues: &[f64], rcond: f64) -> Option<f64> {
    let max_abs = eigenvalues.iter().map(|ev| ev.abs()).fold(0.0, f64::max);
    (max_abs > 0.0).then_some(rcond * max_abs)
}

/// Moore-Penrose pseudo-inverse of a symmetric matrix.
///
/// Eigenvalues with `|λ| <= rcond * max|λ|` are treated as zero. Returns the
/// pseudo-inverse together with the numerical rank.
pub fn pinv_symmetric(a: &Mat<f64>, rcond: f64) -> Result<(Mat<f64>, usize), RegressionError> {
    let n = a.nrows();
    let (eigenvalues, eigenvectors) = symmetric_eigen(a)?;
    let eigenvalues: Vec<f64> = eigenvalues.iter().copied().collect();

    let inv: Vec<f64> = match eigen_cutoff(&eigenvalues, rcond) {
        Some(cutoff) => eigenvalues
            .iter()
            .map(|&ev| if ev.abs() > cutoff { 1.0 / ev } else { 0.0 })
            .collect(),
        None => vec![0.0; n],
    };
    let rank = inv.iter().filter(|&&x| x != 0.0).count();

    // U diag(1/λ) U'
    let scaled = Mat::from_fn(n, n, |i, k| eigenvectors[(i, k)] * inv[k]);
    let out = &scaled * eigenvectors.transpose();

    Ok((symmetrize(&out), rank))
}

/// Numerical rank of a symmetric matrix.
pub fn symmetric_rank(a: &Mat<f64>, rcond: f64) -> Result<usize, RegressionError> {
    let eigenvalues = a.self_adjoint_eigenvalues(Side::Lower).map_err(|err| {
        RegressionError::NumericalError(format!("eigendecomposition failed: {err:?}"))
    })?;
    Ok(match eigen_cutoff(&eigenvalues, rcond) {
        Some(cutoff) => eigenvalues.iter().filter(|ev| ev.abs() > cutoff).count(),
        None => 0,
    })
}

/// Lower Cholesky factor `L` with `A = L L'`.
///
/// Fails with a numerical error when `A` is not positive definite.
pub fn cholesky_lower(a: &Mat<f64>) -> Result<Mat<f64>, RegressionError> {
    let llt = a.llt(Side::Lower).map_err(|err| {
        RegressionError::NumericalError(format!("Cholesky factorization failed: {err:?}"))
    })?;
    Ok(llt.L().to_owned())
}
