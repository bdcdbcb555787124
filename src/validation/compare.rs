//! Element-wise closeness checks between fitted results.

use super::tolerance::{Attribute, Tolerance, Tolerances};
use crate::core::RegressionResult;
use faer::Col;
use log::debug;
use thiserror::Error;

/// A failed comparison.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error(
        "{attribute}[{index}]: actual {actual} vs expected {expected} (rtol {rtol}, atol {atol})"
    )]
    Mismatch {
        attribute: String,
        index: usize,
        actual: f64,
        expected: f64,
        rtol: f64,
        atol: f64,
    },

    #[error("attribute {0} is not available on the result")]
    Unavailable(String),
}

/// `|actual - expected| <= atol + rtol * |expected|`, with `NaN == NaN`.
pub fn is_close(actual: f64, expected: f64, tol: Tolerance) -> bool {
    if actual.is_nan() || expected.is_nan() {
        return actual.is_nan() && expected.is_nan();
    }
    if actual.is_infinite() || expected.is_infinite() {
        return actual == expected;
    }
    (actual - expected).abs() <= tol.atol + tol.rtol * expected.abs()
}

/// Compare two sequences over their overlapping prefix.
///
/// Returns the first element that is not close.
pub fn assert_allclose(
    label: &str,
    actual: &[f64],
    expected: &[f64],
    tol: Tolerance,
) -> Result<(), ValidationError> {
    for (index, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        if !is_close(a, e, tol) {
            return Err(ValidationError::Mismatch {
                attribute: label.to_string(),
                index,
                actual: a,
                expected: e,
                rtol: tol.rtol,
                atol: tol.atol,
            });
        }
    }
    Ok(())
}

/// Attribute-by-attribute comparison of a produced result with a reference.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceCheck {
    pub tolerances: Tolerances,
    /// Skip the standard-error derived attributes.
    pub skip_inference: bool,
}

impl EquivalenceCheck {
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            skip_inference: false,
        }
    }

    pub fn skip_inference(mut self, skip: bool) -> Self {
        self.skip_inference = skip;
        self
    }

    /// Attributes compared by [`check`](Self::check), in order.
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut attributes = Attribute::FIT.to_vec();
        if !self.skip_inference {
            attributes.extend_from_slice(&Attribute::INFERENCE);
        }
        attributes
    }

    /// Stop at the first attribute that differs.
    pub fn check(
        &self,
        produced: &RegressionResult,
        reference: &RegressionResult,
    ) -> Result<(), ValidationError> {
        for attribute in self.attributes() {
            self.check_attribute(attribute, produced, reference)?;
        }
        Ok(())
    }

    /// Compare a single attribute.
    pub fn check_attribute(
        &self,
        attribute: Attribute,
        produced: &RegressionResult,
        reference: &RegressionResult,
    ) -> Result<(), ValidationError> {
        let unavailable = || ValidationError::Unavailable(attribute.name().to_string());
        let actual = attribute.values(produced).ok_or_else(unavailable)?;
        let expected = attribute.values(reference).ok_or_else(unavailable)?;
        let tol = self.tolerances.get(attribute);
        assert_allclose(attribute.name(), &actual, &expected, tol)?;
        debug!(
            "{} matches over {} values (rtol {}, atol {})",
            attribute,
            actual.len().min(expected.len()),
            tol.rtol,
            tol.atol
        );
        Ok(())
    }
}

/// Check that fitted values plus residuals reproduce the response.
pub fn check_self_consistency(
    result: &RegressionResult,
    endog: &Col<f64>,
    tol: Tolerance,
) -> Result<(), ValidationError> {
    let n = result.fitted_values.nrows().min(endog.nrows());
    let rebuilt: Vec<f64> = (0..n)
        .map(|i| result.fitted_values[i] + result.residuals[i])
        .collect();
    let observed: Vec<f64> = (0..n).map(|i| endog[i]).collect();
    assert_allclose("fittedvalues + resid", &rebuilt, &observed, tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close() {
        let tol = Tolerance::new(1e-4, 0.0);
        assert!(is_close(1.00005, 1.0, tol));
        assert!(!is_close(1.0002, 1.0, tol));
        assert!(is_close(f64::NAN, f64::NAN, tol));
        assert!(!is_close(f64::NAN, 1.0, tol));
        assert!(is_close(f64::INFINITY, f64::INFINITY, tol));
        assert!(is_close(1e-21, 0.0, Tolerance::new(1e-4, 1e-20)));
    }

    #[test]
    fn test_overlapping_prefix() {
        let tol = Tolerance::new(1e-8, 0.0);
        assert!(assert_allclose("params", &[1.0, 2.0, 99.0], &[1.0, 2.0], tol).is_ok());
    }

    #[test]
    fn test_first_mismatch_reported() {
        let tol = Tolerance::new(1e-8, 0.0);
        let err = assert_allclose("bse", &[1.0, 2.5, 3.5], &[1.0, 2.0, 3.0], tol).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Mismatch {
                attribute: "bse".to_string(),
                index: 1,
                actual: 2.5,
                expected: 2.0,
                rtol: 1e-8,
                atol: 0.0,
            }
        );
    }

    #[test]
    fn test_identical_results_pass() {
        let mut result = RegressionResult::empty(2, 3);
        result.std_errors = Some(Col::from_fn(2, |_| 1.0));
        result.t_statistics = Some(Col::zeros(2));
        result.p_values = Some(Col::from_fn(2, |_| 1.0));
        // NaN statistics compare equal to themselves
        assert!(EquivalenceCheck::default().check(&result, &result).is_ok());
    }

    #[test]
    fn test_missing_inference_reported() {
        let result = RegressionResult::empty(2, 3);
        let err = EquivalenceCheck::default().check(&result, &result).unwrap_err();
        assert_eq!(err, ValidationError::Unavailable("bse".to_string()));
        assert!(EquivalenceCheck::default()
            .skip_inference(true)
            .check(&result, &result)
            .is_ok());
    }

    #[test]
    fn test_self_consistency() {
        let mut result = RegressionResult::empty(1, 3);
        result.fitted_values = Col::from_fn(3, |i| i as f64);
        result.residuals = Col::from_fn(3, |_| 0.5);
        let y = Col::from_fn(3, |i| i as f64 + 0.5);
        assert!(check_self_consistency(&result, &y, Tolerance::new(1e-12, 0.0)).is_ok());
    }
}
