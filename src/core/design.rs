//! Whitened design shared by the least-squares estimators.

use super::sigma::{ErrorCovariance, Whitener};
use crate::solvers::RegressionError;
use crate::utils::{detect_constant_columns, pinv_symmetric};
use faer::{Col, Mat};

/// Columns whose values differ by less than this are treated as constant.
const CONSTANT_TOLERANCE: f64 = 1e-12;

/// Data and cross products of a (possibly whitened) linear model.
#[derive(Debug, Clone)]
pub(crate) struct Design {
    pub(crate) x: Mat<f64>,
    pub(crate) y: Col<f64>,
    pub(crate) wx: Mat<f64>,
    pub(crate) wy: Col<f64>,
    /// `X̃'X̃`
    pub(crate) xtx: Mat<f64>,
    /// `X̃'ỹ`
    pub(crate) xty: Col<f64>,
    pub(crate) xtx_pinv: Mat<f64>,
    pub(crate) rank: usize,
    pub(crate) k_constant: usize,
    pub(crate) centered_tss: f64,
    pub(crate) uncentered_tss: f64,
    whitener: Whitener,
}

impl Design {
    pub(crate) fn new(
        x: &Mat<f64>,
        y: &Col<f64>,
        sigma: Option<&ErrorCovariance>,
        rcond: f64,
    ) -> Result<Self, RegressionError> {
        let n = x.nrows();
        let k = x.ncols();

        if n != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n,
                y_len: y.nrows(),
            });
        }
        if n < 2 {
            return Err(RegressionError::InsufficientObservations { needed: 2, got: n });
        }
        if k == 0 {
            return Err(RegressionError::NumericalError(
                "design matrix has no columns".to_string(),
            ));
        }
        for i in 0..n {
            if !y[i].is_finite() || (0..k).any(|j| !x[(i, j)].is_finite()) {
                return Err(RegressionError::NumericalError(format!(
                    "non-finite value in row {}",
                    i
                )));
            }
        }

        let whitener = Whitener::new(sigma, n, rcond)?;
        let wx = whitener.whiten_mat(x);
        let wy = whitener.whiten_col(y);

        let xtx = wx.transpose() * &wx;
        let xty = wx.transpose() * &wy;
        let (xtx_pinv, rank) = pinv_symmetric(&xtx, rcond)?;

        let k_constant = usize::from(
            detect_constant_columns(x, CONSTANT_TOLERANCE)
                .into_iter()
                .any(|c| c),
        );

        let uncentered_tss: f64 = (0..n).map(|i| wy[i] * wy[i]).sum();

        // mean of the whitened intercept regression, then whiten the deviations
        let iota = whitener.whiten_col(&Col::from_fn(n, |_| 1.0));
        let iota_sq: f64 = (0..n).map(|i| iota[i] * iota[i]).sum();
        let mean = (0..n).map(|i| wy[i] * iota[i]).sum::<f64>() / iota_sq;
        let deviations = whitener.whiten_col(&Col::from_fn(n, |i| y[i] - mean));
        let centered_tss: f64 = (0..n).map(|i| deviations[i] * deviations[i]).sum();

        Ok(Self {
            x: x.clone(),
            y: y.clone(),
            wx,
            wy,
            xtx,
            xty,
            xtx_pinv,
            rank,
            k_constant,
            centered_tss,
            uncentered_tss,
            whitener,
        })
    }

    pub(crate) fn n_observations(&self) -> usize {
        self.x.nrows()
    }

    pub(crate) fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub(crate) fn log_det_sigma(&self) -> f64 {
        self.whitener.log_det()
    }

    /// Minimum-norm least-squares solution of the whitened model.
    pub(crate) fn least_squares(&self) -> Col<f64> {
        &self.xtx_pinv * &self.xty
    }

    /// Residual sum of squares of the whitened model at `params`.
    pub(crate) fn ssr(&self, params: &Col<f64>) -> f64 {
        let fitted = &self.wx * params;
        (0..self.n_observations())
            .map(|i| {
                let r = self.wy[i] - fitted[i];
                r * r
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> (Mat<f64>, Col<f64>) {
        let x = Mat::from_fn(6, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let y = Col::from_fn(6, |i| 1.0 + 2.0 * i as f64);
        (x, y)
    }

    #[test]
    fn test_design_exact_fit() {
        let (x, y) = line();
        let design = Design::new(&x, &y, None, 1e-12).unwrap();
        assert_eq!(design.rank, 2);
        assert_eq!(design.k_constant, 1);
        let params = design.least_squares();
        assert!((params[0] - 1.0).abs() < 1e-10);
        assert!((params[1] - 2.0).abs() < 1e-10);
        assert!(design.ssr(&params) < 1e-18);
        // mean is 6, sum of squares of 1 + 2i around it is 4 * 17.5
        assert!((design.centered_tss - 70.0).abs() < 1e-10);
    }

    #[test]
    fn test_design_dimension_mismatch() {
        let (x, _) = line();
        let y = Col::zeros(5);
        assert!(matches!(
            Design::new(&x, &y, None, 1e-12),
            Err(RegressionError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_design_rejects_nan() {
        let (x, mut y) = line();
        y[3] = f64::NAN;
        assert!(matches!(
            Design::new(&x, &y, None, 1e-12),
            Err(RegressionError::NumericalError(_))
        ));
    }

    #[test]
    fn test_design_without_constant() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64 + 1.0);
        let y = Col::from_fn(5, |i| i as f64);
        let design = Design::new(&x, &y, None, 1e-12).unwrap();
        assert_eq!(design.k_constant, 0);
        assert!((design.uncentered_tss - 30.0).abs() < 1e-12);
    }
}
