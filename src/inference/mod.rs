//! Statistical inference (standard errors, p-values, confidence intervals).

mod coefficient;
mod compatibility;

pub use coefficient::CoefficientInference;
pub use compatibility::CompatibilityTest;
