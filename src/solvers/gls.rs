//! Generalized Least Squares solver.

use crate::core::{
    Design, ErrorCovariance, RegressionOptions, RegressionOptionsBuilder, RegressionResult,
};
use crate::inference::CoefficientInference;
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use faer::{Col, Mat};
use log::debug;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Generalized Least Squares regression estimator.
///
/// Minimizes: (y - Xβ)' Σ⁻¹ (y - Xβ)
///
/// The problem is solved as OLS on the whitened data `L'X`, `L'y` with
/// `L L' = Σ⁻¹`. Without an error covariance this is plain OLS, with a
/// diagonal one it is WLS. The design matrix is used as given, so a constant
/// column must be supplied by the caller.
///
/// # Example
///
/// ```rust,ignore
/// use regress_mixed::prelude::*;
///
/// let fitted = GlsRegressor::builder()
///     .weights(weights)
///     .build()
///     .fit(&x, &y)?;
///
/// println!("R² = {}", fitted.r_squared());
/// ```
#[derive(Debug, Clone)]
pub struct GlsRegressor {
    options: RegressionOptions,
    sigma: Option<ErrorCovariance>,
    weights: Option<Col<f64>>,
}

impl GlsRegressor {
    /// Create a new GLS regressor with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self {
            options,
            sigma: None,
            weights: None,
        }
    }

    /// Plain OLS with default options.
    pub fn ols() -> Self {
        Self::new(RegressionOptions::ols())
    }

    /// Set the error covariance.
    pub fn with_sigma(mut self, sigma: ErrorCovariance) -> Self {
        self.sigma = Some(sigma);
        self
    }

    /// Set observation weights (inverse error variances).
    pub fn with_weights(mut self, weights: Col<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Create a builder for configuring the regressor.
    pub fn builder() -> GlsRegressorBuilder {
        GlsRegressorBuilder::default()
    }

    pub(crate) fn error_covariance(&self) -> Result<Option<ErrorCovariance>, RegressionError> {
        ErrorCovariance::resolve(self.sigma.as_ref(), self.weights.as_ref())
    }
}

impl Regressor for GlsRegressor {
    type Fitted = FittedGls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        self.options.validate()?;
        let sigma = self.error_covariance()?;
        let design = Design::new(x, y, sigma.as_ref(), self.options.rank_tolerance)?;

        let result = fit_design(&design, self.options.confidence_level);

        debug!(
            "GLS fit: n={}, k={}, rank={}, ssr={:.6e}",
            design.n_observations(),
            design.n_features(),
            design.rank,
            result.ssr
        );

        Ok(FittedGls {
            options: self.options.clone(),
            sigma,
            result,
        })
    }
}

/// Least-squares fit of a prepared design.
pub(crate) fn fit_design(design: &Design, confidence_level: f64) -> RegressionResult {
    let params = design.least_squares();
    assemble_result(
        design,
        params,
        design.xtx_pinv.clone(),
        design.rank as f64,
        None,
        confidence_level,
    )
}

/// Compute fit statistics and inference for `params`.
///
/// `n_effective` is the (possibly fractional) number of estimated parameters
/// including the constant. `scale_override` replaces `ssr / df_resid` as the
/// inference scale.
pub(crate) fn assemble_result(
    design: &Design,
    params: Col<f64>,
    normalized_cov: Mat<f64>,
    n_effective: f64,
    scale_override: Option<f64>,
    confidence_level: f64,
) -> RegressionResult {
    let n_obs = design.n_observations();
    let n = n_obs as f64;
    let k_constant = design.k_constant as f64;

    let df_model = n_effective - k_constant;
    let df_resid = n - n_effective;

    let fitted_values = &design.x * &params;
    let residuals = Col::from_fn(n_obs, |i| design.y[i] - fitted_values[i]);
    let wfitted = &design.wx * &params;
    let whitened_residuals = Col::from_fn(n_obs, |i| design.wy[i] - wfitted[i]);
    let ssr: f64 = (0..n_obs)
        .map(|i| whitened_residuals[i] * whitened_residuals[i])
        .sum();

    let mse_resid = if df_resid > 0.0 { ssr / df_resid } else { f64::NAN };
    let scale = scale_override.unwrap_or(mse_resid);

    // R² is centered only when the model has a constant
    let tss = if design.k_constant > 0 {
        design.centered_tss
    } else {
        design.uncentered_tss
    };
    let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN };
    let adj_r_squared = if df_resid > 0.0 {
        1.0 - (n - k_constant) / df_resid * (1.0 - r_squared)
    } else {
        f64::NAN
    };

    let (f_statistic, f_pvalue) = if df_model > 0.0 && df_resid > 0.0 && mse_resid > 0.0 {
        let f = ((tss - ssr) / df_model) / mse_resid;
        let p = FisherSnedecor::new(df_model, df_resid)
            .ok()
            .map_or(f64::NAN, |d| d.sf(f));
        (f, p)
    } else {
        (f64::NAN, f64::NAN)
    };

    let half_n = n / 2.0;
    let log_likelihood = -half_n * ssr.ln()
        - half_n * (1.0 + (std::f64::consts::PI / half_n).ln())
        - 0.5 * design.log_det_sigma();
    let k = df_model + k_constant;
    let aic = -2.0 * log_likelihood + 2.0 * k;
    let bic = -2.0 * log_likelihood + n.ln() * k;

    let mut result = RegressionResult::empty(params.nrows(), n_obs);
    result.residuals = residuals;
    result.whitened_residuals = whitened_residuals;
    result.fitted_values = fitted_values;
    result.rank = design.rank;
    result.k_constant = design.k_constant;
    result.df_model = df_model;
    result.df_resid = df_resid;
    result.r_squared = r_squared;
    result.adj_r_squared = adj_r_squared;
    result.ssr = ssr;
    result.centered_tss = design.centered_tss;
    result.uncentered_tss = design.uncentered_tss;
    result.scale = scale;
    result.mse_resid = mse_resid;
    result.rmse = mse_resid.sqrt();
    result.f_statistic = f_statistic;
    result.f_pvalue = f_pvalue;
    result.log_likelihood = log_likelihood;
    result.aic = aic;
    result.bic = bic;
    result.confidence_level = confidence_level;

    if df_resid > 0.0 && scale.is_finite() {
        let std_errors = CoefficientInference::standard_errors(&normalized_cov, scale);
        let t_stats = CoefficientInference::t_statistics(&params, &std_errors);
        let p_vals = CoefficientInference::p_values(&t_stats, df_resid);
        let (ci_lower, ci_upper) = CoefficientInference::confidence_intervals(
            &params,
            &std_errors,
            df_resid,
            confidence_level,
        );

        result.std_errors = Some(std_errors);
        result.t_statistics = Some(t_stats);
        result.p_values = Some(p_vals);
        result.conf_interval_lower = Some(ci_lower);
        result.conf_interval_upper = Some(ci_upper);
    }

    result.params = params;
    result.normalized_cov_params = normalized_cov;
    result
}

/// A fitted GLS model.
#[derive(Debug, Clone)]
pub struct FittedGls {
    options: RegressionOptions,
    sigma: Option<ErrorCovariance>,
    result: RegressionResult,
}

impl FittedGls {
    /// Get the options used to fit this model.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Get the error covariance used for fitting, if any.
    pub fn sigma(&self) -> Option<&ErrorCovariance> {
        self.sigma.as_ref()
    }
}

impl FittedRegressor for FittedGls {
    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `GlsRegressor`.
#[derive(Debug, Clone, Default)]
pub struct GlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
    sigma: Option<ErrorCovariance>,
    weights: Option<Col<f64>>,
}

impl GlsRegressorBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error covariance.
    pub fn sigma(mut self, sigma: ErrorCovariance) -> Self {
        self.sigma = Some(sigma);
        self
    }

    /// Set the observation weights.
    pub fn weights(mut self, weights: Col<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Set the relative eigenvalue cutoff used for rank decisions.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    /// Build the GLS regressor.
    pub fn build(self) -> GlsRegressor {
        GlsRegressor {
            options: self.builder.build_unchecked(),
            sigma: self.sigma,
            weights: self.weights,
        }
    }
}
