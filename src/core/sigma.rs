//! Error covariance and the whitening transform used by GLS.

use crate::solvers::RegressionError;
use crate::utils::{cholesky_lower, pinv_symmetric, symmetric_eigen};
use faer::{Col, Mat};

/// Covariance of the regression errors, up to scale.
#[derive(Debug, Clone)]
pub enum ErrorCovariance {
    /// Independent errors with the given variances.
    Diagonal(Col<f64>),
    /// Full `n × n` covariance matrix.
    Full(Mat<f64>),
}

impl ErrorCovariance {
    /// Errors with variances `1 / w_i`, i.e. WLS with weights `w`.
    pub fn from_weights(weights: &Col<f64>) -> Result<Self, RegressionError> {
        let n = weights.nrows();
        for i in 0..n {
            if weights[i] <= 0.0 || !weights[i].is_finite() {
                return Err(RegressionError::InvalidWeights);
            }
        }
        Ok(Self::Diagonal(Col::from_fn(n, |i| 1.0 / weights[i])))
    }

    /// Error covariance from an explicit covariance or from weights.
    ///
    /// The two are mutually exclusive; neither means iid errors.
    pub fn resolve(
        sigma: Option<&ErrorCovariance>,
        weights: Option<&Col<f64>>,
    ) -> Result<Option<Self>, RegressionError> {
        match (sigma, weights) {
            (Some(_), Some(_)) => Err(RegressionError::InvalidCovariance(
                "weights and sigma are mutually exclusive".to_string(),
            )),
            (Some(sigma), None) => Ok(Some(sigma.clone())),
            (None, Some(w)) => Self::from_weights(w).map(Some),
            (None, None) => Ok(None),
        }
    }

    /// Number of observations the covariance describes.
    pub fn dim(&self) -> usize {
        match self {
            Self::Diagonal(v) => v.nrows(),
            Self::Full(m) => m.nrows(),
        }
    }
}

/// Transform `v -> L' v` with `L L' = Σ⁻¹`, so whitened errors are iid.
#[derive(Debug, Clone)]
pub(crate) enum Whitener {
    Identity,
    Diagonal { inv_sqrt: Col<f64>, log_det: f64 },
    Full { factor_t: Mat<f64>, log_det: f64 },
}

impl Whitener {
    pub(crate) fn new(
        sigma: Option<&ErrorCovariance>,
        n: usize,
        rcond: f64,
    ) -> Result<Self, RegressionError> {
        let sigma = match sigma {
            None => return Ok(Self::Identity),
            Some(s) => s,
        };
        if sigma.dim() != n {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n,
                y_len: sigma.dim(),
            });
        }

        match sigma {
            ErrorCovariance::Diagonal(var) => {
                let mut log_det = 0.0;
                for i in 0..n {
                    if var[i] <= 0.0 || !var[i].is_finite() {
                        return Err(RegressionError::InvalidCovariance(format!(
                            "variance {} at index {} is not positive",
                            var[i], i
                        )));
                    }
                    log_det += var[i].ln();
                }
                Ok(Self::Diagonal {
                    inv_sqrt: Col::from_fn(n, |i| 1.0 / var[i].sqrt()),
                    log_det,
                })
            }
            ErrorCovariance::Full(cov) => {
                if cov.ncols() != n {
                    return Err(RegressionError::InvalidCovariance(format!(
                        "covariance must be square, got {}x{}",
                        cov.nrows(),
                        cov.ncols()
                    )));
                }
                let (eigenvalues, _) = symmetric_eigen(cov)?;
                let mut log_det = 0.0;
                for i in 0..n {
                    if eigenvalues[i] <= 0.0 || eigenvalues[i].is_nan() {
                        return Err(RegressionError::InvalidCovariance(
                            "covariance is not positive definite".to_string(),
                        ));
                    }
                    log_det += eigenvalues[i].ln();
                }
                let (precision, _) = pinv_symmetric(cov, rcond)?;
                let lower = cholesky_lower(&precision).map_err(|_| {
                    RegressionError::InvalidCovariance(
                        "inverse covariance has no Cholesky factor".to_string(),
                    )
                })?;
                Ok(Self::Full {
                    factor_t: lower.transpose().to_owned(),
                    log_det,
                })
            }
        }
    }

    /// `ln |Σ|`, zero for the identity.
    pub(crate) fn log_det(&self) -> f64 {
        match self {
            Self::Identity => 0.0,
            Self::Diagonal { log_det, .. } | Self::Full { log_det, .. } => *log_det,
        }
    }

    pub(crate) fn whiten_col(&self, v: &Col<f64>) -> Col<f64> {
        match self {
            Self::Identity => v.clone(),
            Self::Diagonal { inv_sqrt, .. } => Col::from_fn(v.nrows(), |i| v[i] * inv_sqrt[i]),
            Self::Full { factor_t, .. } => factor_t * v,
        }
    }

    pub(crate) fn whiten_mat(&self, x: &Mat<f64>) -> Mat<f64> {
        match self {
            Self::Identity => x.clone(),
            Self::Diagonal { inv_sqrt, .. } => {
                Mat::from_fn(x.nrows(), x.ncols(), |i, j| x[(i, j)] * inv_sqrt[i])
            }
            Self::Full { factor_t, .. } => factor_t * x,
        }
    }
}
