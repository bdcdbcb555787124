//! Compared attributes and their tolerances.

use crate::core::RegressionResult;
use std::collections::HashMap;
use std::fmt;

/// A comparable attribute of a fitted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Params,
    RSquared,
    DfResid,
    DfModel,
    Llf,
    Aic,
    Bic,
    Bse,
    TValues,
    PValues,
    FittedValues,
    Residuals,
}

impl Attribute {
    /// Attributes describing the fit itself.
    pub const FIT: [Attribute; 7] = [
        Self::Params,
        Self::RSquared,
        Self::DfResid,
        Self::DfModel,
        Self::Llf,
        Self::Aic,
        Self::Bic,
    ];

    /// Attributes derived from the standard errors.
    pub const INFERENCE: [Attribute; 3] = [Self::Bse, Self::TValues, Self::PValues];

    pub fn name(self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::RSquared => "rsquared",
            Self::DfResid => "df_resid",
            Self::DfModel => "df_model",
            Self::Llf => "llf",
            Self::Aic => "aic",
            Self::Bic => "bic",
            Self::Bse => "bse",
            Self::TValues => "tvalues",
            Self::PValues => "pvalues",
            Self::FittedValues => "fittedvalues",
            Self::Residuals => "resid",
        }
    }

    /// Values of this attribute, or `None` if the result does not carry it.
    pub fn values(self, result: &RegressionResult) -> Option<Vec<f64>> {
        let col = |c: &faer::Col<f64>| (0..c.nrows()).map(|i| c[i]).collect::<Vec<_>>();
        match self {
            Self::Params => Some(col(&result.params)),
            Self::RSquared => Some(vec![result.r_squared]),
            Self::DfResid => Some(vec![result.df_resid]),
            Self::DfModel => Some(vec![result.df_model]),
            Self::Llf => Some(vec![result.log_likelihood]),
            Self::Aic => Some(vec![result.aic]),
            Self::Bic => Some(vec![result.bic]),
            Self::Bse => result.std_errors.as_ref().map(col),
            Self::TValues => result.t_statistics.as_ref().map(col),
            Self::PValues => result.p_values.as_ref().map(col),
            Self::FittedValues => Some(col(&result.fitted_values)),
            Self::Residuals => Some(col(&result.residuals)),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relative and absolute tolerance: `|a - e| <= atol + rtol * |e|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerance {
    pub const fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }
}

/// Per-attribute tolerances with a default.
#[derive(Debug, Clone)]
pub struct Tolerances {
    default: Tolerance,
    overrides: HashMap<Attribute, Tolerance>,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new(1e-4, 1e-20)
    }
}

impl Tolerances {
    /// Registry whose default is `(rtol, atol)`.
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self {
            default: Tolerance::new(rtol, atol),
            overrides: HashMap::new(),
        }
    }

    /// Replace the default tolerance.
    pub fn with_default(mut self, rtol: f64, atol: f64) -> Self {
        self.default = Tolerance::new(rtol, atol);
        self
    }

    /// Register a tolerance for one attribute.
    pub fn with(mut self, attribute: Attribute, rtol: f64, atol: f64) -> Self {
        self.overrides.insert(attribute, Tolerance::new(rtol, atol));
        self
    }

    /// Tolerance for `attribute`, falling back to the default.
    pub fn get(&self, attribute: Attribute) -> Tolerance {
        self.overrides
            .get(&attribute)
            .copied()
            .unwrap_or(self.default)
    }

    pub fn default_tolerance(&self) -> Tolerance {
        self.default
    }
}
