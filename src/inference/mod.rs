//! inference — post-fit uncertainty for the calibration parameters.
//!
//! Purpose
//! -------
//! Provide classical observed-information covariance and standard errors
//! for a fitted θ̂. The calibration model calls into this after `fit` and
//! maps log-variance standard errors back to the scale with the delta
//! method.
//!
//! Conventions
//! -----------
//! - θ lives in the optimizer's flat layout; variance components are on the
//!   log scale.
//! - Failures are reported as `OptResult`; nothing here panics or logs.

pub mod hessian;

pub use self::hessian::{calc_covariance, calc_standard_errors};

pub mod prelude {
    pub use super::hessian::{calc_covariance, calc_standard_errors};
}
