//! Compatibility of sample information with stochastic prior restrictions.

use crate::solvers::RegressionError;
use crate::utils::{pinv_symmetric, quad_form, symmetric_rank};
use faer::{Col, Mat};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Chi-square test that the unrestricted estimate agrees with the prior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompatibilityTest {
    /// `d' (R Cov R' + Σ_prior)⁻¹ d` with `d = q - R β`.
    pub statistic: f64,
    /// Upper tail probability of the statistic.
    pub p_value: f64,
    /// Rank of the prior covariance.
    pub df: usize,
}

impl CompatibilityTest {
    /// Compare the restrictions `R β = q` with an unrestricted estimate
    /// `params` whose covariance is `cov_params`.
    pub fn compute(
        r_matrix: &Mat<f64>,
        q: &Col<f64>,
        sigma_prior: &Mat<f64>,
        params: &Col<f64>,
        cov_params: &Mat<f64>,
        rcond: f64,
    ) -> Result<Self, RegressionError> {
        let k_r = r_matrix.nrows();
        let r_beta = r_matrix * params;
        let diff = Col::from_fn(k_r, |i| q[i] - r_beta[i]);

        let r_cov_rt = r_matrix * cov_params * r_matrix.transpose();
        let total = Mat::from_fn(k_r, k_r, |i, j| r_cov_rt[(i, j)] + sigma_prior[(i, j)]);

        let (total_inv, _) = pinv_symmetric(&total, rcond)?;
        let statistic = quad_form(&total_inv, &diff);
        let df = symmetric_rank(sigma_prior, rcond)?;

        let p_value = if df > 0 {
            ChiSquared::new(df as f64)
                .ok()
                .map_or(f64::NAN, |d| d.sf(statistic))
        } else {
            f64::NAN
        };

        Ok(Self {
            statistic,
            p_value,
            df,
        })
    }
}
