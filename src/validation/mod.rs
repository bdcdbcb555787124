//! Equivalence harness for comparing fitted results.
//!
//! A [`Tolerances`] registry maps each [`Attribute`] to an `(rtol, atol)`
//! pair. [`EquivalenceCheck`] walks the fit attributes (and, unless skipped,
//! the inference attributes) and reports the first element outside its
//! tolerance.

mod compare;
mod tolerance;

pub use compare::{
    assert_allclose, check_self_consistency, is_close, EquivalenceCheck, ValidationError,
};
pub use tolerance::{Attribute, Tolerance, Tolerances};
