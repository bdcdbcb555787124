//! Non-fatal conditions detected while fitting.

use std::fmt;

/// A discouraged but recoverable configuration encountered during a fit.
#[derive(Debug, Clone, PartialEq)]
pub enum FitWarning {
    /// The prior covariance is singular; its pseudo-inverse is used.
    SingularPriorCovariance { rank: usize, dim: usize },
    /// The effective residual degrees of freedom used by AICc are not positive.
    NonPositiveEffectiveDof { effective_dof: f64 },
}

impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingularPriorCovariance { rank, dim } => write!(
                f,
                "prior covariance is singular (rank {} of {}), using pseudo-inverse",
                rank, dim
            ),
            Self::NonPositiveEffectiveDof { effective_dof } => write!(
                f,
                "effective residual degrees of freedom {:.4} not positive, AICc is infinite",
                effective_dof
            ),
        }
    }
}
