//! Regression solvers implementing least-squares and mixed estimation.

mod gls;
mod selection;
mod theil;
mod traits;

pub use gls::{FittedGls, GlsRegressor, GlsRegressorBuilder};
pub use selection::SelectionCriterion;
pub use theil::{FittedTheil, TheilRegressor, TheilRegressorBuilder};
pub use traits::{FittedRegressor, RegressionError, Regressor};
