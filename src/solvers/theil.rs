//! Mixed estimation with stochastic linear restrictions.
//!
//! The model combines sample information `y = Xβ + u`, `u ~ N(0, σ²Σ)` with
//! prior information `Rβ = q + v`, `v ~ N(0, Σ_prior)` (Theil and Goldberger).
//! The restrictions enter the normal equations with weight `λ σ²_e`, where
//! `σ²_e` is the residual variance of the unrestricted GLS fit:
//!
//! ```text
//! β = (X̃'X̃ + λ σ²_e R' Σ_prior⁻¹ R)⁻¹ (X̃'ỹ + λ σ²_e R' Σ_prior⁻¹ q)
//! ```
//!
//! With `λ = 0` the estimate equals GLS; as `λ` grows the restrictions are
//! imposed exactly.

use super::gls::{assemble_result, fit_design};
use super::selection::{minimize_criterion, SelectionCriterion};
use crate::core::{
    CovType, Design, ErrorCovariance, FitWarning, PriorCovariance, RegressionOptions,
    RegressionOptionsBuilder, RegressionResult, ScaleEstimate,
};
use crate::inference::CompatibilityTest;
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{detect_constant_columns, pinv_symmetric, sandwich};
use faer::{Col, Mat};
use log::{debug, warn};
use std::fmt::Write as _;
use std::sync::Arc;

/// Mixed (Theil-Goldberger) regression estimator.
///
/// # Example
///
/// ```rust,ignore
/// use regress_mixed::prelude::*;
///
/// let fitted = TheilRegressor::builder()
///     .r_matrix(r)
///     .q_matrix(q)
///     .sigma_prior(sigma_prior)
///     .pen_weight(1.0)
///     .cov_type(CovType::DataPrior)
///     .build()
///     .fit(&x, &y)?;
///
/// println!("share of data: {}", fitted.share_data());
/// ```
#[derive(Debug, Clone)]
pub struct TheilRegressor {
    options: RegressionOptions,
    r_matrix: Option<Mat<f64>>,
    q_matrix: Option<Col<f64>>,
    sigma_prior: Option<PriorCovariance>,
    sigma: Option<ErrorCovariance>,
    weights: Option<Col<f64>>,
}

impl TheilRegressor {
    /// Create a new regressor with default restrictions.
    ///
    /// Without an explicit restriction matrix every non-constant parameter is
    /// shrunk towards zero with unit prior variance.
    pub fn new(options: RegressionOptions) -> Self {
        Self {
            options,
            r_matrix: None,
            q_matrix: None,
            sigma_prior: None,
            sigma: None,
            weights: None,
        }
    }

    /// Create a builder for configuring the regressor.
    pub fn builder() -> TheilRegressorBuilder {
        TheilRegressorBuilder::default()
    }

    /// Options used for fitting.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Penalty weight minimising `criterion` for this data.
    ///
    /// The search is a Nelder-Mead simplex starting at `λ = 1`; negative
    /// weights are rejected by the cost function.
    pub fn select_pen_weight(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        criterion: SelectionCriterion,
    ) -> Result<f64, RegressionError> {
        self.options.validate()?;
        let problem = Arc::new(self.prepare(x, y)?);
        minimize_criterion(problem, criterion, &self.options)
    }

    fn prepare(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<MixedProblem, RegressionError> {
        let sigma = ErrorCovariance::resolve(self.sigma.as_ref(), self.weights.as_ref())?;
        MixedProblem::new(
            x,
            y,
            self.r_matrix.as_ref(),
            self.q_matrix.as_ref(),
            self.sigma_prior.as_ref(),
            sigma.as_ref(),
            self.options.rank_tolerance,
        )
    }
}

impl Regressor for TheilRegressor {
    type Fitted = FittedTheil;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        self.options.validate()?;
        let problem = Arc::new(self.prepare(x, y)?);

        debug!(
            "mixed fit: n={}, k={}, restrictions={}, pen_weight={}, sigma2_e={:.6e}",
            problem.design.n_observations(),
            problem.design.n_features(),
            problem.r_matrix.nrows(),
            self.options.pen_weight,
            problem.sigma2_e
        );

        let fitted = problem.fit_at(self.options.pen_weight, &self.options)?;
        for warning in &fitted.warnings {
            warn!("{}", warning);
        }
        Ok(fitted)
    }
}

/// Data, restrictions and cross products that do not depend on `λ`.
#[derive(Debug)]
pub(crate) struct MixedProblem {
    design: Design,
    r_matrix: Mat<f64>,
    q_matrix: Col<f64>,
    sigma_prior: Mat<f64>,
    /// `R' Σ_prior⁺ R`
    prior_precision: Mat<f64>,
    /// `R' Σ_prior⁺ q`
    prior_shift: Col<f64>,
    sigma2_e: f64,
    rcond: f64,
    warnings: Vec<FitWarning>,
}

impl MixedProblem {
    fn new(
        x: &Mat<f64>,
        y: &Col<f64>,
        r_matrix: Option<&Mat<f64>>,
        q_matrix: Option<&Col<f64>>,
        sigma_prior: Option<&PriorCovariance>,
        sigma: Option<&ErrorCovariance>,
        rcond: f64,
    ) -> Result<Self, RegressionError> {
        let design = Design::new(x, y, sigma, rcond)?;
        let k = design.n_features();

        let r_matrix = match r_matrix {
            Some(r) => {
                if r.ncols() != k {
                    return Err(RegressionError::InvalidPrior(format!(
                        "restriction matrix has {} columns but the design has {}",
                        r.ncols(),
                        k
                    )));
                }
                r.clone()
            }
            None => default_restrictions(x),
        };
        let k_r = r_matrix.nrows();
        if k_r == 0 {
            return Err(RegressionError::InvalidPrior(
                "no restrictions to impose".to_string(),
            ));
        }

        let q_matrix = match q_matrix {
            Some(q) => {
                if q.nrows() != k_r {
                    return Err(RegressionError::InvalidPrior(format!(
                        "prior mean has length {} but there are {} restrictions",
                        q.nrows(),
                        k_r
                    )));
                }
                q.clone()
            }
            None => Col::zeros(k_r),
        };

        let sigma_prior = sigma_prior.cloned().unwrap_or_default().to_matrix(k_r)?;
        let (prior_inv, prior_rank) = pinv_symmetric(&sigma_prior, rcond)?;

        let mut warnings = Vec::new();
        if prior_rank < k_r {
            warnings.push(FitWarning::SingularPriorCovariance {
                rank: prior_rank,
                dim: k_r,
            });
        }

        // R' Σ⁺
        let rt_inv = r_matrix.transpose() * &prior_inv;
        let prior_precision = &rt_inv * &r_matrix;
        let prior_shift = &rt_inv * &q_matrix;

        let n = design.n_observations();
        if n <= design.rank {
            return Err(RegressionError::InsufficientObservations {
                needed: design.rank + 1,
                got: n,
            });
        }
        let initial = design.least_squares();
        let sigma2_e = design.ssr(&initial) / (n - design.rank) as f64;

        Ok(Self {
            design,
            r_matrix,
            q_matrix,
            sigma_prior,
            prior_precision,
            prior_shift,
            sigma2_e,
            rcond,
            warnings,
        })
    }

    /// Fit with penalty weight `pen_weight`. Does not log.
    pub(crate) fn fit_at(
        self: &Arc<Self>,
        pen_weight: f64,
        options: &RegressionOptions,
    ) -> Result<FittedTheil, RegressionError> {
        let design = &self.design;
        let n = design.n_observations();
        let k = design.n_features();
        let penalty = self.sigma2_e * pen_weight;

        let xpx = Mat::from_fn(k, k, |i, j| {
            design.xtx[(i, j)] + penalty * self.prior_precision[(i, j)]
        });
        let xpy = Col::from_fn(k, |i| design.xty[i] + penalty * self.prior_shift[i]);
        let (xpxi, _) = pinv_symmetric(&xpx, self.rcond)?;
        let params = &xpxi * &xpy;

        let cov_sandwich = sandwich(&xpxi, &design.xtx);

        // diag of H H' with H = X̃ (X̃'X̃ + P)⁻¹ X̃'
        let xs = &design.wx * &cov_sandwich;
        let hat_diag = Col::from_fn(n, |i| {
            (0..k).map(|a| xs[(i, a)] * design.wx[(i, a)]).sum()
        });
        let hat_trace = if pen_weight == 0.0 {
            design.rank as f64
        } else {
            (0..n).map(|i| hat_diag[i]).sum()
        };

        let normalized_cov = match options.cov_type {
            CovType::DataPrior => xpxi,
            CovType::Sandwich => cov_sandwich,
        };
        let scale_override = match options.scale {
            ScaleEstimate::Residual => None,
            ScaleEstimate::Initial => Some(self.sigma2_e),
        };

        let result = assemble_result(
            design,
            params,
            normalized_cov,
            hat_trace,
            scale_override,
            options.confidence_level,
        );

        let mut warnings = self.warnings.clone();
        let effective_dof = n as f64 - hat_trace - 2.0;
        if effective_dof <= 0.0 {
            warnings.push(FitWarning::NonPositiveEffectiveDof { effective_dof });
        }

        Ok(FittedTheil {
            options: options.clone(),
            problem: Arc::clone(self),
            pen_weight,
            result,
            hat_diag,
            hat_trace,
            warnings,
        })
    }
}

/// Identity restrictions on every non-constant column.
fn default_restrictions(x: &Mat<f64>) -> Mat<f64> {
    let k = x.ncols();
    let keep: Vec<usize> = detect_constant_columns(x, 1e-12)
        .into_iter()
        .enumerate()
        .filter(|&(_, constant)| !constant)
        .map(|(j, _)| j)
        .collect();
    Mat::from_fn(keep.len(), k, |i, j| if keep[i] == j { 1.0 } else { 0.0 })
}

/// A fitted mixed-estimation model.
#[derive(Debug, Clone)]
pub struct FittedTheil {
    options: RegressionOptions,
    problem: Arc<MixedProblem>,
    pen_weight: f64,
    result: RegressionResult,
    hat_diag: Col<f64>,
    hat_trace: f64,
    warnings: Vec<FitWarning>,
}

impl FittedTheil {
    /// Get the options used to fit this model.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Penalty weight of this fit.
    pub fn pen_weight(&self) -> f64 {
        self.pen_weight
    }

    /// Residual variance of the initial GLS fit.
    pub fn sigma2_e(&self) -> f64 {
        self.problem.sigma2_e
    }

    /// Restriction matrix `R` actually used.
    pub fn r_matrix(&self) -> &Mat<f64> {
        &self.problem.r_matrix
    }

    /// Prior mean `q` actually used.
    pub fn q_matrix(&self) -> &Col<f64> {
        &self.problem.q_matrix
    }

    /// Prior covariance actually used.
    pub fn sigma_prior(&self) -> &Mat<f64> {
        &self.problem.sigma_prior
    }

    /// Warnings recorded during the fit.
    pub fn warnings(&self) -> &[FitWarning] {
        &self.warnings
    }

    /// Diagonal of the hat matrix `H H'`.
    pub fn hat_matrix_diag(&self) -> &Col<f64> {
        &self.hat_diag
    }

    /// Effective number of parameters, the trace of the hat matrix.
    pub fn hat_matrix_trace(&self) -> f64 {
        self.hat_trace
    }

    /// Corrected AIC, infinite when `n - trace - 2` is not positive.
    pub fn aicc(&self) -> f64 {
        let n = self.result.n_observations as f64;
        let k = self.hat_trace;
        let denom = n - k - 2.0;
        if denom <= 0.0 {
            return f64::INFINITY;
        }
        self.result.mse_resid.ln() + 1.0 + 2.0 * (1.0 + k) / denom
    }

    /// Generalized cross-validation criterion.
    pub fn gcv(&self) -> f64 {
        let n = self.result.n_observations as f64;
        let ratio = 1.0 - self.hat_trace / n;
        self.result.mse_resid / (ratio * ratio)
    }

    /// Leave-one-out cross-validation criterion.
    pub fn cv(&self) -> f64 {
        let n = self.result.n_observations;
        let total: f64 = (0..n)
            .map(|i| {
                let r = self.result.whitened_residuals[i] / (1.0 - self.hat_diag[i]);
                r * r
            })
            .sum();
        total / n as f64
    }

    /// Bayesian information criterion.
    pub fn bic(&self) -> f64 {
        self.result.bic
    }

    /// Value of a selection criterion at this fit.
    pub fn criterion(&self, criterion: SelectionCriterion) -> f64 {
        match criterion {
            SelectionCriterion::Aicc => self.aicc(),
            SelectionCriterion::Gcv => self.gcv(),
            SelectionCriterion::Cv => self.cv(),
            SelectionCriterion::Bic => self.bic(),
        }
    }

    /// Share of the effective parameters attributable to the sample.
    ///
    /// 1 without restrictions, falling towards `(k - k_r) / k` as the prior
    /// dominates.
    pub fn share_data(&self) -> f64 {
        self.hat_trace / self.problem.design.rank as f64
    }

    /// Test whether the unrestricted OLS estimate agrees with the prior.
    pub fn test_compatibility(&self) -> Result<CompatibilityTest, RegressionError> {
        let design = &self.problem.design;
        let ols = Design::new(&design.x, &design.y, None, self.problem.rcond)?;
        let ols_result = fit_design(&ols, self.options.confidence_level);
        let cov_ols = ols_result.cov_params();

        CompatibilityTest::compute(
            &self.problem.r_matrix,
            &self.problem.q_matrix,
            &self.problem.sigma_prior,
            &ols_result.params,
            &cov_ols,
            self.problem.rcond,
        )
    }

    /// Penalty weight minimising `criterion`, reusing this fit's data.
    pub fn select_pen_weight(&self, criterion: SelectionCriterion) -> Result<f64, RegressionError> {
        minimize_criterion(Arc::clone(&self.problem), criterion, &self.options)
    }

    /// Fixed-width text summary of the fit.
    pub fn summary(&self) -> String {
        let r = &self.result;
        let mut out = String::new();
        let rule = "=".repeat(78);
        let thin = "-".repeat(78);

        let _ = writeln!(out, "{:^78}", "Mixed Estimation Results");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(
            out,
            "{:<22}{:>16}   {:<22}{:>15.4}",
            "No. Observations:", r.n_observations, "R-squared:", r.r_squared
        );
        let _ = writeln!(
            out,
            "{:<22}{:>16.4}   {:<22}{:>15.4}",
            "Df Residuals:", r.df_resid, "Adj. R-squared:", r.adj_r_squared
        );
        let _ = writeln!(
            out,
            "{:<22}{:>16.4}   {:<22}{:>15.4}",
            "Df Model:", r.df_model, "Log-Likelihood:", r.log_likelihood
        );
        let _ = writeln!(
            out,
            "{:<22}{:>16.4}   {:<22}{:>15.4}",
            "Penalty weight:", self.pen_weight, "AIC:", r.aic
        );
        let _ = writeln!(
            out,
            "{:<22}{:>16.4}   {:<22}{:>15.4}",
            "Share of data:", self.share_data(), "BIC:", r.bic
        );
        let cov_label = match self.options.cov_type {
            CovType::Sandwich => "sandwich",
            CovType::DataPrior => "data-prior",
        };
        let _ = writeln!(
            out,
            "{:<22}{:>16}   {:<22}{:>15.4}",
            "Covariance type:", cov_label, "AICc:", self.aicc()
        );
        let _ = writeln!(out, "{}", rule);

        let alpha = 1.0 - r.confidence_level;
        let lo_label = format!("[{:.3}", alpha / 2.0);
        let hi_label = format!("{:.3}]", 1.0 - alpha / 2.0);
        let _ = writeln!(
            out,
            "{:<10}{:>11}{:>11}{:>11}{:>11}{:>12}{:>12}",
            "", "coef", "std err", "t", "P>|t|", lo_label, hi_label
        );
        let _ = writeln!(out, "{}", thin);

        let nan_or = |c: &Option<Col<f64>>, j: usize| c.as_ref().map_or(f64::NAN, |v| v[j]);
        for j in 0..r.n_parameters() {
            let _ = writeln!(
                out,
                "{:<10}{:>11.4}{:>11.4}{:>11.3}{:>11.3}{:>12.3}{:>12.3}",
                format!("x{}", j),
                r.params[j],
                nan_or(&r.std_errors, j),
                nan_or(&r.t_statistics, j),
                nan_or(&r.p_values, j),
                nan_or(&r.conf_interval_lower, j),
                nan_or(&r.conf_interval_upper, j),
            );
        }
        let _ = writeln!(out, "{}", rule);
        out
    }
}

impl FittedRegressor for FittedTheil {
    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `TheilRegressor`.
#[derive(Debug, Clone, Default)]
pub struct TheilRegressorBuilder {
    builder: RegressionOptionsBuilder,
    r_matrix: Option<Mat<f64>>,
    q_matrix: Option<Col<f64>>,
    sigma_prior: Option<PriorCovariance>,
    sigma: Option<ErrorCovariance>,
    weights: Option<Col<f64>>,
}

impl TheilRegressorBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the restriction matrix `R` (k_r × k).
    pub fn r_matrix(mut self, r: Mat<f64>) -> Self {
        self.r_matrix = Some(r);
        self
    }

    /// Set the prior mean `q` (length k_r).
    pub fn q_matrix(mut self, q: Col<f64>) -> Self {
        self.q_matrix = Some(q);
        self
    }

    /// Set the prior covariance: a scalar, a vector of variances or a matrix.
    pub fn sigma_prior(mut self, sigma_prior: impl Into<PriorCovariance>) -> Self {
        self.sigma_prior = Some(sigma_prior.into());
        self
    }

    /// Set the error covariance of the sample model.
    pub fn sigma(mut self, sigma: ErrorCovariance) -> Self {
        self.sigma = Some(sigma);
        self
    }

    /// Set observation weights (inverse error variances).
    pub fn weights(mut self, weights: Col<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the penalty weight of the restrictions.
    pub fn pen_weight(mut self, pen_weight: f64) -> Self {
        self.builder = self.builder.pen_weight(pen_weight);
        self
    }

    /// Set the parameter covariance type.
    pub fn cov_type(mut self, cov_type: CovType) -> Self {
        self.builder = self.builder.cov_type(cov_type);
        self
    }

    /// Set the scale estimate used for inference.
    pub fn scale(mut self, scale: ScaleEstimate) -> Self {
        self.builder = self.builder.scale(scale);
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

    /// Set the maximum iterations for penalty-weight selection.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.builder = self.builder.max_iterations(max_iter);
        self
    }

    /// Set the convergence tolerance for penalty-weight selection.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.tolerance(tol);
        self
    }

    /// Build the regressor.
    ///
    /// Weights and an explicit error covariance are mutually exclusive; the
    /// conflict is reported when fitting.
    pub fn build(self) -> TheilRegressor {
        TheilRegressor {
            options: self.builder.build_unchecked(),
            r_matrix: self.r_matrix,
            q_matrix: self.q_matrix,
            sigma_prior: self.sigma_prior,
            sigma: self.sigma,
            weights: self.weights,
        }
    }
}
