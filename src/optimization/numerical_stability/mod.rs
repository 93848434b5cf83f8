//! numerical_stability — log-scale links for variance components.
//!
//! Purpose
//! -------
//! Hold the small numeric transforms shared by the calibration engine and
//! the inference layer: the exponential link that turns log-variance
//! parameters into scale components, its delta-method standard errors, and
//! the eigenvalue floor used when inverting the observed information.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite `f64`; validation happens in the calibration layer.
//! - Nothing here clamps. A scale that underflows to zero is passed on and
//!   the density turns it into a non-finite NLL.
//!
//! Conventions
//! -----------
//! - Pure functions over `ndarray` views; no logging, no I/O.

pub mod transformations;

pub use self::transformations::{EIGEN_EPS, exp_link, exp_link_se};

pub mod prelude {
    pub use super::transformations::{EIGEN_EPS, exp_link, exp_link_se};
}
