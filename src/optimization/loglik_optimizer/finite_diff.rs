//! loglik_optimizer::finite_diff — numerical derivatives around θ.
//!
//! Purpose
//! -------
//! Wrap the `finitediff` crate for the three places the calibration engine
//! needs numerical derivatives: a fallback gradient when a model has no
//! analytic one, a reference gradient to check the analytic NLL gradient
//! against, and the observed-information Hessian used for standard errors.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: forward-difference gradient of a closure that may
//!   fail, with errors captured through a `RefCell` side channel.
//! - [`central_fd_gradient`]: central-difference gradient of an infallible
//!   scalar function, validated.
//! - [`compute_hessian`]: central-difference Jacobian of a gradient closure,
//!   falling back to forward differences, then symmetrized.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything returned here passes [`validate_grad`] or
//!   [`validate_hessian`].
//! - Differences are taken in the flat θ coordinates, so variance
//!   components are differentiated on the log scale.
//!
//! Testing notes
//! -------------
//! - Unit tests below use closed-form quadratics; the calibration gradient
//!   check lives with the calibration model.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Hessian, Theta,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`.
///
/// `func` cannot return `Result`, so the caller routes failures into
/// `closure_err` and returns NaN. The cell is cleared first; a captured
/// error wins over the numeric result.
///
/// # Errors
/// - The first captured closure error, converted to `OptError`.
/// - [`validate_grad`] failures.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Central-difference gradient of a scalar function.
///
/// # Errors
/// [`validate_grad`] failures, e.g. when `func` is non-finite near `theta`.
pub fn central_fd_gradient<G: Fn(&Theta) -> f64>(theta: &Theta, func: &G) -> OptResult<Grad> {
    let fd_grad = theta.central_diff(func);
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Hessian as the numerical Jacobian of `grad_fn`.
///
/// Central differences first; forward differences if the central matrix
/// has a non-finite cell. The accepted matrix is symmetrized in place.
///
/// # Errors
/// [`validate_hessian`] failures on the forward-difference fallback.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(grad_fn: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(grad_fn);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(grad_fn);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
