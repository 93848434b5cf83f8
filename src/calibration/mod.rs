//! calibration — hierarchical SUVR→CenTauR calibration likelihood.
//!
//! Purpose
//! -------
//! Evaluate, differentiate and fit the negative log-likelihood of a
//! hierarchical linear calibration model. Each tracer maps the harmonized
//! CenTauR scale to SUVR through its own slope and intercept; anchor
//! subjects carry random CenTauR offsets with a zero-mean normal prior; the
//! residual scale is a linear combination of variance components multiplied
//! by the tracer slope, so residual variance lives on the CenTauR scale.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds validated data ([`CalibrationData`]), the θ layout
//!   ([`CalibrationShape`], [`ParamBlock`]), named parameter blocks
//!   ([`CalibrationParams`]) and the two NLL accumulators.
//! - [`models`] exposes [`CalibrationModel`] (NLL, analytic gradient, MLE
//!   fit, standard errors) and the per-term breakdown.
//! - [`errors`] defines [`CalibrationError`] / [`CalibrationResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every dimension is derived from the design matrices and checked once
//!   at construction.
//! - The NLL is a pure function of `(params, data)`: no caches, no hidden
//!   state, bitwise reproducible for identical inputs.
//! - A non-positive standard deviation is a numeric outcome, not an error.
//!   Under the default [`ScaleMode::Unguarded`] it produces a non-finite NLL;
//!   [`ScaleMode::Floored`] is the explicit alternative.
//!
//! Conventions
//! -----------
//! - θ = (slope_tracer, intercept_tracer, centaur_h2h_subj, centaur_subj,
//!   log_sigma_tracer, log_sigma_subj_group).
//! - The calibration layer does no I/O. Fit-level events go through the
//!   `log` facade from [`CalibrationModel::fit`].
//!
//! Downstream usage
//! ----------------
//! 1. Build [`CalibrationData`] from SUVR values and design matrices.
//! 2. Create a model with `CalibrationModel::for_data(&data, options)`.
//! 3. Evaluate `nll` / `nll_grad` directly, or call `fit(theta0, &data)` and
//!    then `standard_errors` / `scale_estimates`.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    CalibrationData, CalibrationOptions, CalibrationParams, CalibrationShape, ParamBlock,
    ScaleMode,
};
pub use self::errors::{CalibrationError, CalibrationResult};
pub use self::models::{CalibrationModel, NllBreakdown, ScaleEstimates};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use centaur_calibration::calibration::prelude::*;
//
// to import the main calibration surface in a single line.

pub mod prelude {
    pub use super::{
        CalibrationData, CalibrationError, CalibrationModel, CalibrationOptions,
        CalibrationParams, CalibrationResult, CalibrationShape, NllBreakdown, ParamBlock,
        ScaleEstimates, ScaleMode,
    };
}
