//! Utility functions for regression analysis.

mod matrix;

pub use matrix::{
    cholesky_lower, detect_constant_columns, identity, pinv_symmetric, quad_form, sandwich,
    symmetric_eigen, symmetric_rank, symmetrize,
};
