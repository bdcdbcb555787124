//! Theil's textile demand data and mixed-estimation results for it.
//!
//! Yearly observations 1923-1939 of log consumption of textiles per capita,
//! log real income per capita and log relative price (Theil 1971). The prior
//! is the one used in Stata's `tgmixed` example:
//! `prior(lprice -0.7 0.15 lincome 1 0.15) cov(lprice lincome -0.01)`.

use faer::{Col, Mat};

/// Rows of `year, lconsump, lincome, lprice`.
pub const TEXTILE_DATA: [[f64; 4]; 17] = [
    [1923.0, 1.99651, 1.98543, 2.00432],
    [1924.0, 1.99564, 1.99167, 2.00043],
    [1925.0, 2.0, 2.0, 2.0],
    [1926.0, 2.04766, 2.02078, 1.95713],
    [1927.0, 2.08707, 2.02078, 1.93702],
    [1928.0, 2.07041, 2.03941, 1.95279],
    [1929.0, 2.08314, 2.04454, 1.95713],
    [1930.0, 2.13354, 2.05038, 1.91803],
    [1931.0, 2.18808, 2.03862, 1.84572],
    [1932.0, 2.18639, 2.02243, 1.81558],
    [1933.0, 2.20003, 2.00732, 1.78746],
    [1934.0, 2.14799, 1.97955, 1.79588],
    [1935.0, 2.13418, 1.98408, 1.80346],
    [1936.0, 2.22531, 1.98945, 1.72099],
    [1937.0, 2.18837, 2.0103, 1.77597],
    [1938.0, 2.17319, 2.00689, 1.77452],
    [1939.0, 2.2188, 2.0162, 1.78746],
];

/// The textile demand data set.
#[derive(Debug, Clone, Copy)]
pub struct Textile;

impl Textile {
    /// Number of yearly observations.
    pub fn nobs() -> usize {
        TEXTILE_DATA.len()
    }

    /// Observation years.
    pub fn years() -> Col<f64> {
        Col::from_fn(Self::nobs(), |i| TEXTILE_DATA[i][0])
    }

    /// Log consumption, the response.
    pub fn endog() -> Col<f64> {
        Col::from_fn(Self::nobs(), |i| TEXTILE_DATA[i][1])
    }

    /// Design `[lincome, lprice, 1]`, constant last as in Stata.
    pub fn exog() -> Mat<f64> {
        Mat::from_fn(Self::nobs(), 3, |i, j| match j {
            0 => TEXTILE_DATA[i][2],
            1 => TEXTILE_DATA[i][3],
            _ => 1.0,
        })
    }

    /// Restrictions selecting the income and price elasticities.
    pub fn r_matrix() -> Mat<f64> {
        Mat::from_fn(2, 3, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    /// Prior means: income elasticity 1, price elasticity -0.7.
    pub fn q_matrix() -> Col<f64> {
        Col::from_fn(2, |i| if i == 0 { 1.0 } else { -0.7 })
    }

    /// Prior covariance: standard deviations 0.15, covariance -0.01.
    pub fn sigma_prior() -> Mat<f64> {
        Mat::from_fn(2, 2, |i, j| if i == j { 0.15 * 0.15 } else { -0.01 })
    }
}

/// Expected results of the textile mixed fit.
///
/// Penalty weight 1, data-prior covariance, and the initial OLS scale for
/// inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TheilTextileResults {
    pub params: [f64; 3],
    pub bse: [f64; 3],
    pub tvalues: [f64; 3],
    pub conf_int_lower: [f64; 3],
    pub conf_int_upper: [f64; 3],
    pub r2: f64,
    /// Residual degrees of freedom reported by `tgmixed` (n - k).
    pub df_r: f64,
    /// RMSE on `df_r` residual degrees of freedom.
    pub rmse: f64,
    /// Compatibility statistic and its chi-square p-value.
    pub compat: f64,
    pub pvalue: f64,
    /// Residual variance of the unrestricted OLS fit.
    pub sigma2_e: f64,
    /// Share of the effective parameters attributable to the sample.
    pub share_data: f64,
}

pub const THEIL_TEXTILE: TheilTextileResults = TheilTextileResults {
    params: [1.0893575364948447, -0.8205459255815839, 1.4666424304277825],
    bse: [0.10338925783873555, 0.03496500297325395, 0.2034781044728039],
    tvalues: [10.536467320367095, -23.467634943696428, 7.207863638339566],
    conf_int_lower: [0.8688806256778435, -0.8951085639387969, 1.0327267139319933],
    conf_int_upper: [1.309834447311846, -0.7459832872243709, 1.9005581469235717],
    r2: 0.9741055554858034,
    df_r: 14.0,
    rmse: 0.013609756456435291,
    compat: 0.860627310106872,
    pvalue: 0.6503050912534826,
    sigma2_e: 0.00018334123641580062,
    share_data: 0.6946116246864239,
};

/// OLS on the textile data, which the mixed fit reproduces at penalty weight 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextileOlsResults {
    pub params: [f64; 3],
    pub bse: [f64; 3],
}

pub const TEXTILE_OLS: TextileOlsResults = TextileOlsResults {
    params: [1.1431750324463792, -0.8288616609495065, 1.373921398218954],
    bse: [0.1559813409897678, 0.03610625518721172, 0.30605134490135216],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        assert_eq!(Textile::nobs(), 17);
        let x = Textile::exog();
        assert_eq!(x.ncols(), 3);
        assert_eq!(x[(16, 2)], 1.0);
        assert_eq!(Textile::years()[0], 1923.0);
        assert_eq!(Textile::endog()[2], 2.0);
    }

    #[test]
    fn test_prior() {
        let s = Textile::sigma_prior();
        assert!((s[(0, 0)] - 0.0225).abs() < 1e-15);
        assert_eq!(s[(0, 1)], s[(1, 0)]);
        assert_eq!(Textile::q_matrix()[1], -0.7);
        assert_eq!(Textile::r_matrix()[(1, 1)], 1.0);
    }

    #[test]
    fn test_compat_pvalue_consistent() {
        // chi2 with 2 df has survival exp(-x/2)
        let p = (-THEIL_TEXTILE.compat / 2.0).exp();
        assert!((p - THEIL_TEXTILE.pvalue).abs() < 1e-12);
    }
}
