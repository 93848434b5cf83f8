//! optimization — argmin seam, numeric transforms, and the optimizer error surface.
//!
//! Purpose
//! -------
//! Connect the calibration likelihood engine to an external gradient-based
//! optimizer. The engine only knows how to evaluate a negative
//! log-likelihood and its gradient; this layer turns that into an argmin
//! problem, runs L-BFGS on it, and normalizes whatever comes back.
//!
//! Key behaviors
//! -------------
//! - Expose [`loglik_optimizer`]: the [`LogLikelihood`] trait, the
//!   [`maximize`] entry point, solver builders, finite-difference helpers,
//!   and configuration types ([`MLEOptions`], [`Tolerances`]).
//! - Provide the small numeric transforms in [`numerical_stability`]
//!   (exponential link for variance components, delta-method scaling, and
//!   the eigenvalue floor used by inference).
//! - Collapse argmin failures, option mistakes, and calibration-model
//!   errors into a single enum, [`errors::OptError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters handed to argmin are the flat θ vector whose block layout
//!   is owned by `calibration::core::shape::CalibrationShape`.
//! - The calibration engine reports `ℓ(θ) = −NLL(θ)`; argmin minimizes the
//!   cost `c(θ) = −ℓ(θ) = NLL(θ)`.
//! - A non-finite NLL is a legitimate engine output. At θ₀ it is refused
//!   with `OptError::NonFiniteCost`; at a trial point the adapter prices it
//!   at `+∞` so the default backtracking line search contracts the step.
//!
//! Conventions
//! -----------
//! - `Theta`, `Grad`, `Hessian` are `ndarray` aliases over `f64`.
//! - Public entry points return `OptResult<T>`; raw argmin errors never
//!   escape this module.
//!
//! [`LogLikelihood`]: loglik_optimizer::LogLikelihood
//! [`maximize`]: loglik_optimizer::maximize
//! [`MLEOptions`]: loglik_optimizer::MLEOptions
//! [`Tolerances`]: loglik_optimizer::Tolerances

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
