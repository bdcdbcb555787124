//! Integration tests for GLS regression.

mod common;

use approx::assert_relative_eq;
use common::{columns, init_logging, rows, sample, to_vec, SAMPLE_SEED};
use faer::{Col, Mat};
use regress_mixed::core::ErrorCovariance;
use regress_mixed::solvers::{FittedRegressor, GlsRegressor, RegressionError, Regressor};
use regress_mixed::validation::{
    assert_allclose, check_self_consistency, Attribute, EquivalenceCheck, Tolerance, Tolerances,
};

#[test]
fn test_ols_normal_equations() {
    init_logging();
    let (y, x) = sample(SAMPLE_SEED);
    let fitted = GlsRegressor::ols().fit(&x, &y).expect("fit should succeed");
    let r = fitted.result();

    // X'e = 0 at the least-squares solution
    for j in 0..x.ncols() {
        let score: f64 = (0..x.nrows()).map(|i| x[(i, j)] * r.residuals[i]).sum();
        assert!(score.abs() < 1e-9, "column {j}: {score}");
    }

    assert_eq!(r.rank, 5);
    assert_eq!(r.k_constant, 1);
    assert_relative_eq!(r.df_model, 4.0);
    assert_relative_eq!(r.df_resid, 195.0);
    assert!(r.r_squared > 0.0 && r.r_squared < 1.0);
    assert!(r.f_pvalue >= 0.0 && r.f_pvalue <= 1.0);
    check_self_consistency(r, &y, Tolerance::new(1e-12, 1e-12)).unwrap();
}

#[test]
fn test_scaled_identity_covariance_matches_ols() {
    let (y, x) = sample(SAMPLE_SEED);
    let n = y.nrows();
    let ols = GlsRegressor::ols().fit(&x, &y).unwrap();
    let gls = GlsRegressor::builder()
        .sigma(ErrorCovariance::Diagonal(Col::from_fn(n, |_| 4.0)))
        .build()
        .fit(&x, &y)
        .unwrap();

    // the scale absorbs the constant variance, the log-determinant cancels
    // the change in ssr
    EquivalenceCheck::new(Tolerances::new(1e-10, 1e-14))
        .check(gls.result(), ols.result())
        .unwrap();
    assert_relative_eq!(gls.result().ssr * 4.0, ols.result().ssr, max_relative = 1e-12);
}

#[test]
fn test_full_diagonal_matches_diagonal() {
    let (y, x) = sample(SAMPLE_SEED);
    let idx: Vec<usize> = (0..60).collect();
    let x = rows(&x, &idx);
    let y = Col::from_fn(60, |i| y[i]);
    let variances = Col::from_fn(60, |i| 0.5 + (i % 3) as f64);

    let diagonal = GlsRegressor::builder()
        .sigma(ErrorCovariance::Diagonal(variances.clone()))
        .build()
        .fit(&x, &y)
        .unwrap();
    let full = GlsRegressor::builder()
        .sigma(ErrorCovariance::Full(Mat::from_fn(60, 60, |i, j| {
            if i == j {
                variances[i]
            } else {
                0.0
            }
        })))
        .build()
        .fit(&x, &y)
        .unwrap();

    EquivalenceCheck::new(Tolerances::new(1e-9, 1e-12))
        .check(full.result(), diagonal.result())
        .unwrap();
}

/// AR(1) errors with unit innovation variance.
fn ar1_covariance(n: usize, rho: f64) -> Mat<f64> {
    Mat::from_fn(n, n, |i, j| {
        rho.powi((i as i32 - j as i32).abs()) / (1.0 - rho * rho)
    })
}

/// Prais-Winsten transform, a square root of the AR(1) precision.
fn prais_winsten(x: &Mat<f64>, rho: f64) -> Mat<f64> {
    Mat::from_fn(x.nrows(), x.ncols(), |i, j| {
        if i == 0 {
            (1.0 - rho * rho).sqrt() * x[(0, j)]
        } else {
            x[(i, j)] - rho * x[(i - 1, j)]
        }
    })
}

#[test]
fn test_ar1_covariance_matches_whitened_ols() {
    init_logging();
    let rho = 0.5;
    let (y, x) = sample(SAMPLE_SEED);
    let idx: Vec<usize> = (0..60).collect();
    let x = rows(&x, &idx);
    let y = Col::from_fn(60, |i| y[i]);

    let gls = GlsRegressor::builder()
        .sigma(ErrorCovariance::Full(ar1_covariance(60, rho)))
        .build()
        .fit(&x, &y)
        .expect("fit should succeed");

    let y_mat = Mat::from_fn(60, 1, |i, _| y[i]);
    let wy = prais_winsten(&y_mat, rho);
    let wy = Col::from_fn(60, |i| wy[(i, 0)]);
    let whitened = GlsRegressor::ols()
        .fit(&prais_winsten(&x, rho), &wy)
        .unwrap();

    let tol = Tolerance::new(1e-9, 1e-12);
    assert_allclose(
        "params",
        &to_vec(gls.params()),
        &to_vec(whitened.params()),
        tol,
    )
    .unwrap();
    assert_allclose(
        "bse",
        &to_vec(gls.result().std_errors.as_ref().unwrap()),
        &to_vec(whitened.result().std_errors.as_ref().unwrap()),
        tol,
    )
    .unwrap();
    assert_relative_eq!(gls.result().ssr, whitened.result().ssr, max_relative = 1e-9);

    // log det of the AR(1) covariance is -ln(1 - rho^2)
    assert_relative_eq!(
        gls.result().log_likelihood,
        whitened.result().log_likelihood + 0.5 * (1.0 - rho * rho).ln(),
        max_relative = 1e-9
    );
}

#[test]
fn test_weights_match_scaled_rows() {
    let (y, x) = sample(SAMPLE_SEED);
    let n = y.nrows();
    let weights = Col::from_fn(n, |i| 1.0 + (i % 4) as f64);

    let wls = GlsRegressor::builder()
        .weights(weights.clone())
        .build()
        .fit(&x, &y)
        .unwrap();
    let xs = Mat::from_fn(n, x.ncols(), |i, j| weights[i].sqrt() * x[(i, j)]);
    let ys = Col::from_fn(n, |i| weights[i].sqrt() * y[i]);
    let ols = GlsRegressor::ols().fit(&xs, &ys).unwrap();

    let tol = Tolerance::new(1e-10, 1e-14);
    assert_allclose("params", &to_vec(wls.params()), &to_vec(ols.params()), tol).unwrap();
    assert_allclose(
        "bse",
        &to_vec(wls.result().std_errors.as_ref().unwrap()),
        &to_vec(ols.result().std_errors.as_ref().unwrap()),
        tol,
    )
    .unwrap();
}

#[test]
fn test_nested_models_differ() {
    let (y, x) = sample(SAMPLE_SEED);
    let full = GlsRegressor::ols().fit(&x, &y).unwrap();
    let reduced = GlsRegressor::ols().fit(&columns(&x, 3), &y).unwrap();

    assert!(reduced.result().ssr >= full.result().ssr);
    assert!(reduced.result().r_squared <= full.result().r_squared);

    // the check stops at the first attribute of different length or value
    let err = EquivalenceCheck::new(Tolerances::default().with(Attribute::Params, 1e-6, 0.0))
        .check(reduced.result(), full.result())
        .unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_input_errors() {
    let (y, x) = sample(SAMPLE_SEED);

    let short = Col::from_fn(10, |i| y[i]);
    assert!(matches!(
        GlsRegressor::ols().fit(&x, &short),
        Err(RegressionError::DimensionMismatch { .. })
    ));

    let one = Mat::from_fn(1, 2, |_, _| 1.0);
    assert!(matches!(
        GlsRegressor::ols().fit(&one, &Col::from_fn(1, |_| 1.0)),
        Err(RegressionError::InsufficientObservations { .. })
    ));

    let mut bad = y.clone();
    bad[3] = f64::NAN;
    assert!(matches!(
        GlsRegressor::ols().fit(&x, &bad),
        Err(RegressionError::NumericalError(_))
    ));

    let negative = Col::from_fn(y.nrows(), |i| if i == 0 { -1.0 } else { 1.0 });
    assert!(matches!(
        GlsRegressor::builder().weights(negative).build().fit(&x, &y),
        Err(RegressionError::InvalidWeights)
    ));

    let indefinite = Mat::from_fn(200, 200, |i, j| match (i, j) {
        (0, 0) => -1.0,
        _ if i == j => 1.0,
        _ => 0.0,
    });
    assert!(matches!(
        GlsRegressor::builder()
            .sigma(ErrorCovariance::Full(indefinite))
            .build()
            .fit(&x, &y),
        Err(RegressionError::InvalidCovariance(_))
    ));
}
