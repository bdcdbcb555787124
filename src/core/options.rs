//! Regression options and configuration.

use thiserror::Error;

/// Which matrix is used as the normalized parameter covariance of a mixed fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovType {
    /// `(X'X + P)⁻¹ X'X (X'X + P)⁻¹`: treats the prior as non-random.
    #[default]
    Sandwich,
    /// `(X'X + P)⁻¹`: counts the prior as additional data.
    DataPrior,
}

/// Source of the residual scale used for inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleEstimate {
    /// `ssr / df_resid` of the fit itself (default).
    #[default]
    Residual,
    /// Scale of the initial, unrestricted GLS fit.
    ///
    /// This is the convention of Stata's `tgmixed`.
    Initial,
}

/// Configuration options for regression models.
#[derive(Debug, Clone)]
pub struct RegressionOptions {
    /// Confidence level for confidence intervals (default: 0.95).
    pub confidence_level: f64,
    /// Relative eigenvalue cutoff for pseudo-inverses and rank (default: 1e-12).
    pub rank_tolerance: f64,
    /// Weight of the stochastic restrictions in mixed estimation (default: 1.0).
    pub pen_weight: f64,
    /// Parameter covariance type for mixed estimation.
    pub cov_type: CovType,
    /// Scale used for standard errors of mixed estimation.
    pub scale: ScaleEstimate,
    /// Maximum iterations for penalty-weight selection.
    pub max_iterations: usize,
    /// Simplex cost tolerance for penalty-weight selection.
    pub tolerance: f64,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            rank_tolerance: 1e-12,
            pen_weight: 1.0,
            cov_type: CovType::Sandwich,
            scale: ScaleEstimate::Residual,
            max_iterations: 500,
            tolerance: 1e-10,
        }
    }
}

/// Errors that can occur when validating regression options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("pen_weight must be non-negative and finite, got {0}")]
    InvalidPenWeight(f64),
    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),
    #[error("rank_tolerance must be in [0, 1), got {0}")]
    InvalidRankTolerance(f64),
    #[error("tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
    #[error("max_iterations must be at least 1, got {0}")]
    InvalidMaxIterations(usize),
    #[error("unknown selection criterion: {0}")]
    UnknownCriterion(String),
}

impl RegressionOptions {
    /// Create a new builder for regression options.
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    /// Options for a plain least-squares fit.
    pub fn ols() -> Self {
        Self::default()
    }

    /// Options for a mixed fit with the given penalty weight.
    pub fn mixed(pen_weight: f64) -> Self {
        Self {
            pen_weight,
            ..Default::default()
        }
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.pen_weight >= 0.0 && self.pen_weight.is_finite()) {
            return Err(OptionsError::InvalidPenWeight(self.pen_weight));
        }
        if self.confidence_level <= 0.0 || self.confidence_level >= 1.0 {
            return Err(OptionsError::InvalidConfidenceLevel(self.confidence_level));
        }
        if !(0.0..1.0).contains(&self.rank_tolerance) {
            return Err(OptionsError::InvalidRankTolerance(self.rank_tolerance));
        }
        if self.tolerance <= 0.0 {
            return Err(OptionsError::InvalidTolerance(self.tolerance));
        }
        if self.max_iterations < 1 {
            return Err(OptionsError::InvalidMaxIterations(self.max_iterations));
        }
        Ok(())
    }
}

/// Builder for `RegressionOptions`.
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    /// Set the relative eigenvalue cutoff used for rank decisions.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Set the penalty weight of the stochastic restrictions.
    pub fn pen_weight(mut self, pen_weight: f64) -> Self {
        self.options.pen_weight = pen_weight;
        self
    }

    /// Set the parameter covariance type.
    pub fn cov_type(mut self, cov_type: CovType) -> Self {
        self.options.cov_type = cov_type;
        self
    }

    /// Set the scale estimate used for inference.
    pub fn scale(mut self, scale: ScaleEstimate) -> Self {
        self.options.scale = scale;
        self
    }

    /// Set the maximum iterations for penalty-weight selection.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.options.max_iterations = max_iter;
        self
    }

    /// Set the convergence tolerance for penalty-weight selection.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.options.tolerance = tol;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RegressionOptions::default();
        assert!((opts.confidence_level - 0.95).abs() < 1e-10);
        assert!((opts.pen_weight - 1.0).abs() < 1e-10);
        assert_eq!(opts.cov_type, CovType::Sandwich);
        assert_eq!(opts.scale, ScaleEstimate::Residual);
    }

    #[test]
    fn test_builder() {
        let opts = RegressionOptions::builder()
            .pen_weight(0.5)
            .cov_type(CovType::DataPrior)
            .scale(ScaleEstimate::Initial)
            .build()
            .unwrap();

        assert!((opts.pen_weight - 0.5).abs() < 1e-10);
        assert_eq!(opts.cov_type, CovType::DataPrior);
        assert_eq!(opts.scale, ScaleEstimate::Initial);
    }

    #[test]
    fn test_validation_invalid_pen_weight() {
        let result = RegressionOptions::builder().pen_weight(-1.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidPenWeight(_))));

        let result = RegressionOptions::builder().pen_weight(f64::NAN).build();
        assert!(matches!(result, Err(OptionsError::InvalidPenWeight(_))));
    }

    #[test]
    fn test_zero_pen_weight_is_valid() {
        assert!(RegressionOptions::mixed(0.0).validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_confidence_level() {
        let result = RegressionOptions::builder().confidence_level(1.0).build();
        assert!(matches!(
            result,
            Err(OptionsError::InvalidConfidenceLevel(_))
        ));
    }

    #[test]
    fn test_validation_invalid_rank_tolerance() {
        let result = RegressionOptions::builder().rank_tolerance(-1e-3).build();
        assert!(matches!(result, Err(OptionsError::InvalidRankTolerance(_))));
    }

    #[test]
    fn test_validation_invalid_tolerance() {
        let result = RegressionOptions::builder().tolerance(0.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidTolerance(_))));
    }

    #[test]
    fn test_validation_invalid_max_iterations() {
        let result = RegressionOptions::builder().max_iterations(0).build();
        assert!(matches!(result, Err(OptionsError::InvalidMaxIterations(_))));
    }
}
