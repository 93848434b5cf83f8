//! Scale transforms for variance components.
//!
//! Variance components are optimized on the log scale and mapped back with
//! an elementwise exponential. The transform is total over the reals; it
//! saturates to `0` / `+∞` at the extremes of `f64` and is deliberately not
//! clamped, so the objective stays smooth for the optimizer.
//!
//! # Provided items
//! - [`EIGEN_EPS`]: eigenvalue floor for information-matrix pseudoinverses.
//! - [`exp_link`]: `σ = exp(log σ)` over a vector.
//! - [`exp_link_se`]: delta-method standard errors of `σ` given standard
//!   errors of `log σ`.
use ndarray::{Array1, ArrayView1, Zip};

/// Eigenvalues of the observed information at or below this are treated as
/// zero when forming the pseudoinverse.
pub const EIGEN_EPS: f64 = 1e-10;

/// Elementwise exponential link from log-scale components to scales.
pub fn exp_link(log_params: ArrayView1<f64>) -> Array1<f64> {
    log_params.mapv(f64::exp)
}

/// Delta method for the exponential link.
///
/// `dσ/d(log σ) = σ`, so `se(σ) = σ · se(log σ)`. Both views must have the
/// same length; the caller slices them from the same θ block.
pub fn exp_link_se(scales: ArrayView1<f64>, log_se: ArrayView1<f64>) -> Array1<f64> {
    let mut out = Array1::zeros(scales.len());
    Zip::from(&mut out).and(&scales).and(&log_se).for_each(|o, &s, &se| *o = s * se);
    out
}
