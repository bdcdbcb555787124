//! Penalty-weight selection for mixed estimation.

use super::theil::MixedProblem;
use crate::core::{OptionsError, RegressionOptions};
use crate::solvers::RegressionError;
use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::neldermead::NelderMead;
use log::{debug, trace};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Initial penalty weight of the simplex search.
const START_PEN_WEIGHT: f64 = 1.0;

/// Model selection criterion minimised over the penalty weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionCriterion {
    /// Corrected Akaike information criterion.
    #[default]
    Aicc,
    /// Generalized cross-validation.
    Gcv,
    /// Leave-one-out cross-validation.
    Cv,
    /// Bayesian information criterion.
    Bic,
}

impl SelectionCriterion {
    /// All criteria, in a fixed order.
    pub const ALL: [SelectionCriterion; 4] = [Self::Aicc, Self::Gcv, Self::Cv, Self::Bic];

    pub fn name(self) -> &'static str {
        match self {
            Self::Aicc => "aicc",
            Self::Gcv => "gcv",
            Self::Cv => "cv",
            Self::Bic => "bic",
        }
    }
}

impl fmt::Display for SelectionCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionCriterion {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aicc" => Ok(Self::Aicc),
            "gcv" => Ok(Self::Gcv),
            "cv" => Ok(Self::Cv),
            "bic" => Ok(Self::Bic),
            _ => Err(OptionsError::UnknownCriterion(s.to_string())),
        }
    }
}

/// Criterion value as a function of the penalty weight.
struct PenWeightCost {
    problem: Arc<MixedProblem>,
    criterion: SelectionCriterion,
    options: RegressionOptions,
}

impl CostFunction for PenWeightCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let pen_weight = match param.first() {
            Some(&w) if w >= 0.0 => w,
            _ => return Ok(f64::INFINITY),
        };
        let value = match self.problem.fit_at(pen_weight, &self.options) {
            Ok(fitted) => fitted.criterion(self.criterion),
            Err(err) => {
                trace!("{}({:.6}) failed: {}", self.criterion, pen_weight, err);
                f64::INFINITY
            }
        };
        trace!("{}({:.6}) = {:.8}", self.criterion, pen_weight, value);
        // the simplex ordering cannot handle NaN
        Ok(if value.is_nan() { f64::INFINITY } else { value })
    }
}

/// Minimise `criterion` over the penalty weight with a Nelder-Mead simplex.
pub(crate) fn minimize_criterion(
    problem: Arc<MixedProblem>,
    criterion: SelectionCriterion,
    options: &RegressionOptions,
) -> Result<f64, RegressionError> {
    let cost = PenWeightCost {
        problem,
        criterion,
        options: options.clone(),
    };
    let solver: NelderMead<Vec<f64>, f64> =
        NelderMead::new(vec![vec![START_PEN_WEIGHT], vec![START_PEN_WEIGHT * 1.05]])
            .with_sd_tolerance(options.tolerance)
            .map_err(|e| RegressionError::Optimization(e.to_string()))?;

    let res = Executor::new(cost, solver)
        .configure(|state| state.max_iters(options.max_iterations as u64))
        .run()
        .map_err(|e| RegressionError::Optimization(e.to_string()))?;

    let state = res.state();
    let best = state
        .get_best_param()
        .and_then(|p| p.first().copied())
        .ok_or_else(|| RegressionError::Optimization("no best parameter".to_string()))?;

    debug!(
        "selected pen_weight={:.6} by {} after {} iterations (cost {:.8})",
        best,
        criterion,
        state.get_iter(),
        state.get_best_cost()
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criterion_from_str() {
        assert_eq!("aicc".parse::<SelectionCriterion>().unwrap(), SelectionCriterion::Aicc);
        assert_eq!("GCV".parse::<SelectionCriterion>().unwrap(), SelectionCriterion::Gcv);
        assert_eq!("cv".parse::<SelectionCriterion>().unwrap(), SelectionCriterion::Cv);
        assert_eq!("bic".parse::<SelectionCriterion>().unwrap(), SelectionCriterion::Bic);
        assert!(matches!(
            "aic".parse::<SelectionCriterion>(),
            Err(OptionsError::UnknownCriterion(_))
        ));
    }

    #[test]
    fn test_criterion_display_round_trip() {
        for c in SelectionCriterion::ALL {
            assert_eq!(c.to_string().parse::<SelectionCriterion>().unwrap(), c);
        }
    }
}
