//! Coefficient inference calculations.

use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Compute standard errors from the normalized covariance.
    ///
    /// SE(β_j) = sqrt(scale * C_jj)
    pub fn standard_errors(normalized_cov: &Mat<f64>, scale: f64) -> Col<f64> {
        Col::from_fn(normalized_cov.nrows(), |j| {
            let var = scale * normalized_cov[(j, j)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        })
    }

    /// Compute t-statistics for coefficients.
    ///
    /// t_j = β_j / SE(β_j)
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        let n = coefficients.nrows();
        let mut t_stats = Col::zeros(n);

        for j in 0..n {
            if std_errors[j].is_nan() || std_errors[j] == 0.0 {
                t_stats[j] = f64::NAN;
            } else {
                t_stats[j] = coefficients[j] / std_errors[j];
            }
        }

        t_stats
    }

    /// Compute p-values from t-statistics.
    ///
    /// p_j = 2 * P(T > |t_j|) where T ~ t(df). `df` may be fractional.
    pub fn p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
        let n = t_statistics.nrows();
        let t_dist = match Self::t_distribution(df) {
            Some(d) => d,
            None => return Col::from_fn(n, |_| f64::NAN),
        };

        Col::from_fn(n, |j| {
            let t = t_statistics[j];
            if t.is_nan() {
                f64::NAN
            } else {
                // sf keeps precision for large |t|
                2.0 * t_dist.sf(t.abs())
            }
        })
    }

    /// Compute confidence intervals for coefficients.
    ///
    /// CI_j = β_j ± t_{α/2, df} * SE(β_j)
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        df: f64,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let n = coefficients.nrows();
        let t_dist = match Self::t_distribution(df) {
            Some(d) => d,
            None => return (Col::from_fn(n, |_| f64::NAN), Col::from_fn(n, |_| f64::NAN)),
        };

        let alpha = 1.0 - confidence_level;
        let t_crit = t_dist.inverse_cdf(1.0 - alpha / 2.0);

        let lower = Col::from_fn(n, |j| coefficients[j] - t_crit * std_errors[j]);
        let upper = Col::from_fn(n, |j| coefficients[j] + t_crit * std_errors[j]);
        (lower, upper)
    }

    fn t_distribution(df: f64) -> Option<StudentsT> {
        if df > 0.0 && df.is_finite() {
            StudentsT::new(0.0, 1.0, df).ok()
        } else {
            None
        }
    }
}
