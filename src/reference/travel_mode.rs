//! Conditional logit travel-mode choice estimates.
//!
//! Greene (2003, p. 729) as replicated by R's `mlogit`:
//!
//! ```r
//! library("mlogit", "TravelMode")
//! names(TravelMode) <- c("individual", "mode", "choice", "ttme", "invc",
//!                        "invt", "gc", "hinc", "psize")
//! TravelMode$hinc_air <- with(TravelMode, hinc * (mode == "air"))
//! res <- mlogit(choice ~ gc + ttme + hinc_air, data = TravelMode,
//!               shape = "long", alt.var = "mode", reflevel = "car")
//! res$coefficients
//! res$hessian
//! ```

use faer::{Col, Mat};

/// Number of estimated coefficients.
pub const N_PARAMS: usize = 6;

/// Published estimates of the travel-mode conditional logit model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelModeChoice {
    /// Number of individuals.
    pub nobs: usize,
    /// Coefficients in R's output order.
    pub params: [f64; N_PARAMS],
    /// Hessian of the log-likelihood at convergence.
    pub hessian: [[f64; N_PARAMS]; N_PARAMS],
}

/// The `mlogit` record.
pub const TRAVEL_MODE_CHOICE: TravelModeChoice = TravelModeChoice {
    nobs: 210,
    params: [
        -0.01550151,
        -0.09612462,
        5.20743293,
        0.013287011,
        3.86903570,
        3.16319033,
    ],
    hessian: [
        [
            -7.54742053e+04,
            -1.68416889e+04,
            1.92371522e+02,
            7.78063150e+03,
            -7.76604449e+02,
            -2.17068300e+01,
        ],
        [
            -1.68416889e+04,
            -9.14469710e+04,
            -1.10997845e+03,
            -4.34480365e+04,
            -3.13751079e+02,
            -1.59840260e+02,
        ],
        [
            1.92371520e+02,
            -1.10997840e+03,
            -2.56136270e+01,
            -9.93264100e+02,
            7.71506200e+00,
            3.88369600e+00,
        ],
        [
            7.78063148e+03,
            -4.34480365e+04,
            -9.93264146e+02,
            -4.80541196e+04,
            2.84426623e+02,
            1.44526736e+02,
        ],
        [
            -7.76604450e+02,
            -3.13751100e+02,
            7.71506200e+00,
            2.84426600e+02,
            -2.87075270e+01,
            6.76657400e+00,
        ],
        [
            -2.17068300e+01,
            -1.59840300e+02,
            3.88369600e+00,
            1.44526700e+02,
            6.76657400e+00,
            -1.79784270e+01,
        ],
    ],
};

impl TravelModeChoice {
    /// The published record.
    pub fn greene() -> Self {
        TRAVEL_MODE_CHOICE
    }

    /// Coefficients as a column.
    pub fn params_col(&self) -> Col<f64> {
        Col::from_fn(N_PARAMS, |i| self.params[i])
    }

    /// Hessian as a matrix.
    pub fn hessian_mat(&self) -> Mat<f64> {
        Mat::from_fn(N_PARAMS, N_PARAMS, |i, j| self.hessian[i][j])
    }

    /// Largest relative asymmetry `|H_ij - H_ji| / max(|H_ij|, |H_ji|)`.
    ///
    /// The published literals are rounded independently, so this is small
    /// but not zero.
    pub fn max_relative_asymmetry(&self) -> f64 {
        let mut worst: f64 = 0.0;
        for i in 0..N_PARAMS {
            for j in (i + 1)..N_PARAMS {
                let a = self.hessian[i][j];
                let b = self.hessian[j][i];
                let denom = a.abs().max(b.abs());
                if denom > 0.0 {
                    worst = worst.max((a - b).abs() / denom);
                }
            }
        }
        worst
    }

    /// Whether the Hessian is symmetric up to relative tolerance `rtol`.
    pub fn is_symmetric(&self, rtol: f64) -> bool {
        self.max_relative_asymmetry() <= rtol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_shape() {
        let rec = TravelModeChoice::greene();
        assert_eq!(rec.nobs, 210);
        assert_eq!(rec.params_col().nrows(), 6);
        let h = rec.hessian_mat();
        assert_eq!(h.nrows(), 6);
        assert_eq!(h.ncols(), 6);
        assert_eq!(h[(0, 0)], -7.54742053e+04);
    }

    #[test]
    fn test_hessian_negative_diagonal() {
        let rec = TravelModeChoice::greene();
        for i in 0..N_PARAMS {
            assert!(rec.hessian[i][i] < 0.0);
        }
    }

    #[test]
    fn test_hessian_symmetric_to_rounding() {
        let rec = TravelModeChoice::greene();
        assert!(rec.is_symmetric(1e-6));
        assert!(!rec.is_symmetric(0.0));
    }
}
