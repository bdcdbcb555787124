//! Common test utilities and data generators.

#![allow(dead_code)]

use faer::{Col, Mat};

/// Deterministic 64-bit linear congruential generator.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform on [0, 1) with 53 bits.
    pub fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Standard normal via Box-Muller (cosine branch only).
    pub fn normal(&mut self) -> f64 {
        let u1 = 1.0 - self.uniform();
        let u2 = self.uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

/// Seed for the 200 x 5 regression sample.
pub const SAMPLE_SEED: u64 = 5;

/// 200 x 5 design with a constant first column and
/// `y = X 0.5 [0.1, 1, 1, 0, 0] + 2 e`.
pub fn sample(seed: u64) -> (Col<f64>, Mat<f64>) {
    let (n, k) = (200, 5);
    let beta = [0.05, 0.5, 0.5, 0.0, 0.0];
    let mut rng = Lcg::new(seed);

    let mut x = Mat::zeros(n, k);
    for i in 0..n {
        for j in 0..k {
            x[(i, j)] = rng.normal();
        }
        x[(i, 0)] = 1.0;
    }
    let mut y = Col::zeros(n);
    for i in 0..n {
        let mean: f64 = (0..k).map(|j| x[(i, j)] * beta[j]).sum();
        y[i] = mean + 2.0 * rng.normal();
    }
    (y, x)
}

/// First `k` columns of `x`.
pub fn columns(x: &Mat<f64>, k: usize) -> Mat<f64> {
    Mat::from_fn(x.nrows(), k, |i, j| x[(i, j)])
}

/// Rows of `x` at `idx`.
pub fn rows(x: &Mat<f64>, idx: &[usize]) -> Mat<f64> {
    Mat::from_fn(idx.len(), x.ncols(), |i, j| x[(idx[i], j)])
}

/// Elements of `y` at `idx`.
pub fn elems(y: &Col<f64>, idx: &[usize]) -> Col<f64> {
    Col::from_fn(idx.len(), |i| y[idx[i]])
}

pub const N_GROUPS: usize = 60;
pub const OBS_PER_GROUP: usize = 5;
pub const PANEL_SEED: u64 = 1234;

/// Balanced panel with random group intercepts.
///
/// Columns are two regressors followed by one dummy per group:
/// `y = 1 + x0 + x1 + mu_g + 2 e`, `mu_g = 2 + u_g`.
pub fn panel(seed: u64) -> (Col<f64>, Mat<f64>) {
    let n = N_GROUPS * OBS_PER_GROUP;
    let mut rng = Lcg::new(seed);

    let mut ex = Vec::with_capacity(n);
    for _ in 0..n {
        let a = rng.normal();
        let b = rng.normal();
        ex.push([a, b]);
    }
    let group_means: Vec<f64> = (0..N_GROUPS).map(|_| 2.0 + rng.normal()).collect();

    let mut y = Col::zeros(n);
    for i in 0..n {
        y[i] = 1.0 + ex[i][0] + ex[i][1] + group_means[i / OBS_PER_GROUP] + 2.0 * rng.normal();
    }
    let x = Mat::from_fn(n, 2 + N_GROUPS, |i, j| match j {
        0 | 1 => ex[i][j],
        _ => {
            if i / OBS_PER_GROUP == j - 2 {
                1.0
            } else {
                0.0
            }
        }
    });
    (y, x)
}

/// Restrictions shrinking the group effects towards their mean.
///
/// Row `i` is `e_i - 1/G` over the first `G - 1` dummies, with the first
/// dummy's coefficient set to -1.
pub fn panel_restrictions() -> (Mat<f64>, Col<f64>) {
    let k_r = N_GROUPS - 1;
    let mut r = Mat::zeros(k_r, 2 + N_GROUPS);
    for i in 0..k_r {
        for j in 0..k_r {
            let eye = if i == j { 1.0 } else { 0.0 };
            r[(i, 3 + j)] = eye - 1.0 / N_GROUPS as f64;
        }
        r[(i, 2)] = -1.0;
    }
    (r, Col::zeros(k_r))
}

/// Fisher-Yates permutation of `0..n`.
pub fn shuffle(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = Lcg::new(seed);
    let mut idx: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        idx.swap(i, j);
    }
    idx
}

/// Route `log` output through the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Collect a column into a vector.
pub fn to_vec(c: &Col<f64>) -> Vec<f64> {
    (0..c.nrows()).map(|i| c[i]).collect()
}
