//! Bridge from [`LogLikelihood`] to argmin's `CostFunction` / `Gradient`.
//!
//! argmin minimizes, so the adapter exposes `c(θ) = -ℓ(θ)`. For the
//! calibration model this is the NLL. A trial point where `ℓ(θ)` is NaN or
//! ±∞ costs `+∞`, so an Armijo backtracking line search shrinks the step
//! until it lands back in the finite region. Start points are screened by
//! [`maximize`](super::maximize) before the solver runs.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        Cost, Grad, Theta, finite_diff::run_fd_diff, traits::LogLikelihood,
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Finite-difference gradient of the cost: central first, forward if a
    /// cost evaluation failed or the central result is not finite.
    fn fd_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |theta: &Theta| -> f64 {
            self.cost(theta).unwrap_or_else(|e| {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            })
        };
        let central = theta.central_diff(&cost_func);
        if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }
        Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// `c(θ) = -ℓ(θ)`, or `+∞` when `ℓ(θ)` is NaN/±∞.
    ///
    /// # Errors
    /// Model errors only.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.f.value(theta, self.data)?;
        if !value.is_finite() {
            log::trace!("non-finite log-likelihood {value} at trial point, cost set to +inf");
            return Ok(f64::INFINITY);
        }
        Ok(-value)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// `∇c(θ) = -∇ℓ(θ)` when the model supplies a gradient; otherwise a
    /// finite-difference gradient of the cost itself.
    ///
    /// # Errors
    /// Model errors other than `GradientNotImplemented`, errors from cost
    /// evaluations during differencing, and [`validate_grad`] failures.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.fd_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}
