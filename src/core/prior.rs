//! Prior covariance of stochastic restrictions.

use crate::solvers::RegressionError;
use faer::{Col, Mat};

/// Largest tolerated `|a_ij - a_ji|` relative to the largest entry.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Covariance `Σ_prior` of the restriction noise `v` in `R β = q + v`.
#[derive(Debug, Clone)]
pub enum PriorCovariance {
    /// `s · I`.
    Scalar(f64),
    /// Diagonal matrix with the given variances.
    Diagonal(Col<f64>),
    /// Full `k_r × k_r` matrix.
    Full(Mat<f64>),
}

impl Default for PriorCovariance {
    fn default() -> Self {
        Self::Scalar(1.0)
    }
}

impl PriorCovariance {
    /// Expand to a dense `k_r × k_r` matrix.
    ///
    /// Variances must be finite and non-negative and a full matrix must be
    /// symmetric. Zero variances are allowed and make the prior singular.
    pub fn to_matrix(&self, k_r: usize) -> Result<Mat<f64>, RegressionError> {
        match self {
            Self::Scalar(s) => {
                check_variance(*s, 0)?;
                Ok(Mat::from_fn(k_r, k_r, |i, j| if i == j { *s } else { 0.0 }))
            }
            Self::Diagonal(d) => {
                if d.nrows() != k_r {
                    return Err(RegressionError::InvalidPrior(format!(
                        "prior variances have length {} but there are {} restrictions",
                        d.nrows(),
                        k_r
                    )));
                }
                for i in 0..k_r {
                    check_variance(d[i], i)?;
                }
                Ok(Mat::from_fn(k_r, k_r, |i, j| if i == j { d[i] } else { 0.0 }))
            }
            Self::Full(m) => {
                if m.nrows() != k_r || m.ncols() != k_r {
                    return Err(RegressionError::InvalidPrior(format!(
                        "prior covariance is {}x{} but there are {} restrictions",
                        m.nrows(),
                        m.ncols(),
                        k_r
                    )));
                }
                let mut max_abs = 0.0_f64;
                for j in 0..k_r {
                    for i in 0..k_r {
                        if !m[(i, j)].is_finite() {
                            return Err(RegressionError::InvalidPrior(format!(
                                "prior covariance has non-finite entry at ({}, {})",
                                i, j
                            )));
                        }
                        max_abs = max_abs.max(m[(i, j)].abs());
                    }
                }
                for j in 0..k_r {
                    check_variance(m[(j, j)], j)?;
                    for i in (j + 1)..k_r {
                        if (m[(i, j)] - m[(j, i)]).abs() > SYMMETRY_TOLERANCE * max_abs {
                            return Err(RegressionError::InvalidPrior(format!(
                                "prior covariance is not symmetric at ({}, {})",
                                i, j
                            )));
                        }
                    }
                }
                Ok(m.clone())
            }
        }
    }
}

fn check_variance(v: f64, index: usize) -> Result<(), RegressionError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(RegressionError::InvalidPrior(format!(
            "prior variance {} at index {} must be finite and non-negative",
            v, index
        )))
    }
}

impl From<f64> for PriorCovariance {
    fn from(s: f64) -> Self {
        Self::Scalar(s)
    }
}

impl From<Col<f64>> for PriorCovariance {
    fn from(d: Col<f64>) -> Self {
        Self::Diagonal(d)
    }
}

impl From<Mat<f64>> for PriorCovariance {
    fn from(m: Mat<f64>) -> Self {
        Self::Full(m)
    }
}
