//! Regression result structures.

use faer::{Col, Mat};

/// Complete result from a regression fit.
///
/// Read-only snapshot taken after fitting. Degrees of freedom are real valued
/// because mixed estimation uses the trace of the hat matrix as the effective
/// number of parameters.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    // ========== Core Results ==========
    /// Estimated parameters, one per design column.
    pub params: Col<f64>,

    /// Residuals on the original scale (y - fitted_values).
    pub residuals: Col<f64>,

    /// Residuals of the whitened model.
    pub whitened_residuals: Col<f64>,

    /// Fitted values on the original scale.
    pub fitted_values: Col<f64>,

    // ========== Rank Information ==========
    /// Number of observations.
    pub n_observations: usize,

    /// Numerical rank of the whitened design matrix.
    pub rank: usize,

    /// 1 if the design contains a constant column, otherwise 0.
    pub k_constant: usize,

    /// Model degrees of freedom (excluding the constant).
    pub df_model: f64,

    /// Residual degrees of freedom.
    pub df_resid: f64,

    // ========== Fit Statistics ==========
    /// Coefficient of determination (R²).
    pub r_squared: f64,

    /// Adjusted R².
    pub adj_r_squared: f64,

    /// Sum of squared whitened residuals.
    pub ssr: f64,

    /// Total sum of squares around the (whitened) mean.
    pub centered_tss: f64,

    /// Uncentered total sum of squares of the whitened response.
    pub uncentered_tss: f64,

    /// Scale used for inference (error variance estimate).
    pub scale: f64,

    /// Residual mean square `ssr / df_resid`.
    pub mse_resid: f64,

    /// Root of `mse_resid`.
    pub rmse: f64,

    /// F-statistic for overall model significance.
    pub f_statistic: f64,

    /// P-value for F-statistic.
    pub f_pvalue: f64,

    // ========== Information Criteria ==========
    /// Gaussian log-likelihood.
    pub log_likelihood: f64,

    /// Akaike Information Criterion.
    pub aic: f64,

    /// Bayesian Information Criterion.
    pub bic: f64,

    // ========== Inference Statistics (Optional) ==========
    /// Parameter covariance divided by the scale.
    pub normalized_cov_params: Mat<f64>,

    /// Standard errors of parameters.
    pub std_errors: Option<Col<f64>>,

    /// t-statistics for parameters.
    pub t_statistics: Option<Col<f64>>,

    /// Two-sided p-values for parameter significance tests.
    pub p_values: Option<Col<f64>>,

    /// Lower bounds of confidence intervals.
    pub conf_interval_lower: Option<Col<f64>>,

    /// Upper bounds of confidence intervals.
    pub conf_interval_upper: Option<Col<f64>>,

    /// Confidence level used for intervals.
    pub confidence_level: f64,
}

impl RegressionResult {
    /// Create a new empty result (used internally by solvers).
    pub(crate) fn empty(n_features: usize, n_observations: usize) -> Self {
        Self {
            params: Col::zeros(n_features),
            residuals: Col::zeros(n_observations),
            whitened_residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            n_observations,
            rank: 0,
            k_constant: 0,
            df_model: 0.0,
            df_resid: 0.0,
            r_squared: 0.0,
            adj_r_squared: 0.0,
            ssr: 0.0,
            centered_tss: 0.0,
            uncentered_tss: 0.0,
            scale: f64::NAN,
            mse_resid: f64::NAN,
            rmse: f64::NAN,
            f_statistic: f64::NAN,
            f_pvalue: f64::NAN,
            log_likelihood: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
            normalized_cov_params: Mat::zeros(n_features, n_features),
            std_errors: None,
            t_statistics: None,
            p_values: None,
            conf_interval_lower: None,
            conf_interval_upper: None,
            confidence_level: 0.95,
        }
    }

    /// Number of parameters.
    pub fn n_parameters(&self) -> usize {
        self.params.nrows()
    }

    /// Whether inference statistics are available.
    pub fn has_inference(&self) -> bool {
        self.std_errors.is_some()
    }

    /// Parameter covariance matrix `scale * normalized_cov_params`.
    pub fn cov_params(&self) -> Mat<f64> {
        let k = self.normalized_cov_params.nrows();
        Mat::from_fn(k, k, |i, j| self.scale * self.normalized_cov_params[(i, j)])
    }
}
