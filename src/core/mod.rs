//! Core types for regression analysis.

mod design;
mod options;
mod prior;
mod result;
mod sigma;
mod warning;

pub(crate) use design::Design;
pub use options::{
    CovType, OptionsError, RegressionOptions, RegressionOptionsBuilder, ScaleEstimate,
};
pub use prior::PriorCovariance;
pub use result::RegressionResult;
pub use sigma::ErrorCovariance;
pub use warning::FitWarning;
