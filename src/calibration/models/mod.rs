//! models — calibration model API and term-level internals.
//!
//! Purpose
//! -------
//! Compose the `calibration::core` accumulators into a model that the
//! generic log-likelihood optimizer can fit, and expose the per-term view
//! of the NLL for diagnostics.
//!
//! Key behaviors
//! -------------
//! - [`CalibrationModel`] implements [`LogLikelihood`] with an analytic
//!   gradient and provides `nll`, `nll_grad`, `fit`, `standard_errors`, and
//!   `scale_estimates`.
//! - [`model_internals`] walks observations and builds an
//!   [`NllBreakdown`] whose total equals the model NLL.
//!
//! Invariants & assumptions
//! ------------------------
//! - θ always has length `CalibrationShape::theta_len()` and finite entries;
//!   [`LogLikelihood::check`] enforces this before a fit.
//! - Data passed to a model must share its design dimensions; mismatches are
//!   reported, never truncated.
//!
//! Testing notes
//! -------------
//! - [`calibration`](self::calibration) tests the closed-form NLL cases, the
//!   gradient against finite differences, and a small end-to-end fit.
//! - [`model_internals`] tests additivity and per-row quantities.
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood
//! [`LogLikelihood::check`]: crate::optimization::loglik_optimizer::LogLikelihood::check

pub mod calibration;
pub mod model_internals;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::calibration::{CalibrationModel, ScaleEstimates};
pub use self::model_internals::{
    NllBreakdown, fitted_breakdown, nll_breakdown, observation_fits, walk_observations,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use centaur_calibration::calibration::models::prelude::*;
//
// to import the main calibration model surface in a single line.

pub mod prelude {
    pub use super::calibration::{CalibrationModel, ScaleEstimates};
    pub use super::model_internals::{NllBreakdown, nll_breakdown};
}
