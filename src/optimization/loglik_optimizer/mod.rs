//! loglik_optimizer — argmin-backed maximization of a log-likelihood.
//!
//! Purpose
//! -------
//! Let a model that can evaluate `ℓ(θ)` (and ideally `∇ℓ(θ)`) be fitted
//! with argmin's L-BFGS without knowing anything about argmin. For the
//! calibration engine `ℓ(θ) = −NLL(θ)`.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] exposes `c(θ) = −ℓ(θ)` and `∇c(θ)` to argmin,
//!   pricing non-finite trial points at `+∞` and falling back to finite
//!   differences when the model has no analytic gradient.
//! - [`maximize`] checks θ₀ (including a finite `ℓ(θ₀)`), picks the line
//!   search, runs the solver via [`run::run_lbfgs`], and returns an
//!   [`OptimOutcome`]. A solver that aborts mid-run is an error, not an
//!   unconverged outcome.
//! - [`finite_diff`] wraps `finitediff` for gradients and Hessians with
//!   post-hoc validation; [`validation`] holds the shared checks.
//!
//! Conventions
//! -----------
//! - [`LogLikelihood::grad`] returns `∇ℓ(θ)`; the adapter flips the sign.
//! - [`OptimOutcome::value`] is reported on the log-likelihood scale, so a
//!   calibration fit reports `−NLL(θ̂)`.
//! - Errors are [`OptResult<T>`](crate::optimization::errors::OptResult).

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
