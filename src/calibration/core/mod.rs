//! core — calibration data, parameter layout, and NLL accumulators.
//!
//! Purpose
//! -------
//! Collect the building blocks of the SUVR→CenTauR calibration likelihood:
//! validated data and design matrices, the θ layout, the structured
//! parameter type, the variance transform, the normal density, and the two
//! accumulators (random-effect prior and observation likelihood). The model
//! layer in `calibration::models` composes these into an NLL and gradient.
//!
//! Key behaviors
//! -------------
//! - [`CalibrationData`] validates shapes and finiteness once; every
//!   dimension comes from [`CalibrationData::shape`].
//! - [`CalibrationParams`] names the six θ blocks and converts to and from
//!   the flat optimizer vector through [`CalibrationShape`].
//! - [`VarianceScales`] applies the exponential link once per evaluation.
//! - [`prior_nll`] / [`observation_nll`] accumulate the two NLL stages;
//!   their `accumulate_*_grad` twins add analytic partials into a
//!   [`CalibrationParams`] of zeros.
//!
//! Invariants & assumptions
//! ------------------------
//! - Accumulators assume `params` and `data` agree on shape. The model layer
//!   checks this before calling them.
//! - No accumulator validates a standard deviation. Non-positive scales flow
//!   into the density according to [`ScaleMode`].
//!
//! Conventions
//! -----------
//! - Indexing is 0-based. Rows of every observation-level matrix are
//!   observations; rows of `v_subj` are anchor subjects.
//! - Everything here is pure: no I/O, no logging, no cached state.
//!
//! Testing notes
//! -------------
//! - Each submodule tests its own closed-form cases; `prior` and
//!   `observation` check their gradients against central differences.

pub mod data;
pub mod density;
pub mod observation;
pub mod options;
pub mod params;
pub mod prior;
pub mod shape;
pub mod validation;
pub mod variance;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::CalibrationData;
pub use self::density::{NormalTerm, neg_log_normal, neg_log_normal_term};
pub use self::observation::{
    ObservationFit, accumulate_observation_grad, fit_observation, observation_nll,
};
pub use self::options::CalibrationOptions;
pub use self::params::CalibrationParams;
pub use self::prior::{PriorTerm, accumulate_prior_grad, prior_nll, prior_term, subject_sd};
pub use self::shape::{CalibrationShape, ParamBlock};
pub use self::validation::validate_theta;
pub use self::variance::{ScaleMode, VarianceScales};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use centaur_calibration::calibration::core::prelude::*;
//
// to import the main calibration core surface in a single line.

pub mod prelude {
    pub use super::data::CalibrationData;
    pub use super::options::CalibrationOptions;
    pub use super::params::CalibrationParams;
    pub use super::shape::{CalibrationShape, ParamBlock};
    pub use super::variance::{ScaleMode, VarianceScales};
}
