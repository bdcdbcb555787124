//! Core traits for regression estimators.

use crate::core::RegressionResult;
use faer::{Col, Mat};
use thiserror::Error;

/// Errors that can occur during regression fitting.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("feature mismatch: model has {expected} parameters but X has {got} columns")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] crate::core::OptionsError),

    #[error("invalid weights: all weights must be positive and finite")]
    InvalidWeights,

    #[error("invalid prior: {0}")]
    InvalidPrior(String),

    #[error("invalid error covariance: {0}")]
    InvalidCovariance(String),

    #[error("numerical error: {0}")]
    NumericalError(String),

    #[error("penalty weight selection failed: {0}")]
    Optimization(String),
}

/// A regression estimator that can be fit to data.
///
/// Fitting returns a fitted model that can then make predictions.
pub trait Regressor {
    /// The type of the fitted model.
    type Fitted: FittedRegressor;

    /// Fit the model to the data.
    ///
    /// # Arguments
    /// * `x` - Design matrix of shape (n_samples, n_features), used as is
    /// * `y` - Target vector of length n_samples
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

/// A fitted regression model that can make predictions.
pub trait FittedRegressor {
    /// Access the regression results (parameters, statistics, etc.).
    fn result(&self) -> &RegressionResult;

    /// Make predictions on new data with the same columns as the fit.
    fn predict(&self, x: &Mat<f64>) -> Result<Col<f64>, RegressionError> {
        let params = &self.result().params;
        if x.ncols() != params.nrows() {
            return Err(RegressionError::FeatureMismatch {
                expected: params.nrows(),
                got: x.ncols(),
            });
        }
        Ok(x * params)
    }

    /// Get the parameters (convenience method).
    fn params(&self) -> &Col<f64> {
        &self.result().params
    }

    /// Get R² (convenience method).
    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }

    /// Parameter covariance matrix.
    fn cov_params(&self) -> Mat<f64> {
        self.result().cov_params()
    }
}
