//! Mixed (Theil-Goldberger) estimation and GLS with statistical inference.
//!
//! The crate provides least-squares estimators with full inference, an
//! estimator that combines sample data with stochastic linear restrictions on
//! the parameters, immutable reference results to compare against, and a
//! small harness for checking that two fits agree attribute by attribute.
//!
//! # Example
//!
//! ```rust,ignore
//! use regress_mixed::prelude::*;
//!
//! // Shrink the price and income elasticities towards a prior
//! let fitted = TheilRegressor::builder()
//!     .r_matrix(Textile::r_matrix())
//!     .q_matrix(Textile::q_matrix())
//!     .sigma_prior(Textile::sigma_prior())
//!     .cov_type(CovType::DataPrior)
//!     .build()
//!     .fit(&Textile::exog(), &Textile::endog())?;
//!
//! println!("{}", fitted.summary());
//!
//! // A heavily penalized fit matches OLS on the unrestricted columns
//! let ols = GlsRegressor::ols().fit(&x_reduced, &y)?;
//! EquivalenceCheck::default().check(fitted.result(), ols.result())?;
//! ```

pub mod core;
pub mod inference;
pub mod reference;
pub mod solvers;
pub mod utils;
pub mod validation;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        CovType, ErrorCovariance, FitWarning, PriorCovariance, RegressionOptions,
        RegressionOptionsBuilder, RegressionResult, ScaleEstimate,
    };
    pub use crate::inference::CompatibilityTest;
    pub use crate::reference::{ReferenceTable, Textile, TravelModeChoice};
    pub use crate::solvers::{
        FittedGls, FittedRegressor, FittedTheil, GlsRegressor, RegressionError, Regressor,
        SelectionCriterion, TheilRegressor,
    };
    pub use crate::validation::{
        Attribute, EquivalenceCheck, Tolerance, Tolerances, ValidationError,
    };
}

pub use crate::core::{
    CovType, ErrorCovariance, FitWarning, PriorCovariance, RegressionOptions,
    RegressionOptionsBuilder, RegressionResult, ScaleEstimate,
};
pub use crate::solvers::{
    FittedGls, FittedRegressor, FittedTheil, GlsRegressor, RegressionError, Regressor,
    SelectionCriterion, TheilRegressor,
};
