//! Public optimizer surface: the [`LogLikelihood`] trait, options, and outcome.
//!
//! Convention: a model reports its log-likelihood `ℓ(θ)`; argmin minimizes
//! `c(θ) = -ℓ(θ)`. For the calibration engine `ℓ(θ) = -NLL(θ)`, so the cost
//! argmin sees is the NLL itself.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Log-likelihood interface consumed by [`maximize`](super::maximize).
///
/// - `value(&Theta, &Data)`: evaluate `ℓ(θ)`. A non-finite value is allowed
///   here. At θ₀ it fails the fit with [`OptError::NonFiniteCost`]; at a
///   trial point the adapter prices it at `+∞` and the line search backs
///   off.
/// - `check(&Theta, &Data)`: reject θ/data pairs that cannot be evaluated
///   at all (wrong length, non-finite entries). Called once before fitting.
/// - `grad(&Theta, &Data)`: optional analytic `∇ℓ(θ)`. The default returns
///   [`OptError::GradientNotImplemented`], which switches the adapter to
///   finite differences.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside L-BFGS.
///
/// Parses case-insensitively from `"Backtracking"` / `"MoreThuente"` /
/// `"HagerZhang"`; anything else is [`OptError::InvalidLineSearch`].
///
/// - `Backtracking`: Armijo sufficient decrease, evaluates only costs at
///   trial points, so it steps back out of regions where `ℓ` is not finite.
/// - `MoreThuente`, `HagerZhang`: Wolfe-type searches that also need the
///   gradient at every trial point. A trial point outside the finite region
///   usually aborts the run with [`OptError::SolverAborted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    Backtracking,
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backtracking" => Ok(LineSearcher::Backtracking),
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'Backtracking', 'MoreThuente' or \
                         'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// - `tols`: stopping rules, see [`Tolerances`].
/// - `line_searcher`: line search for L-BFGS.
/// - `verbose`: attach the slog observer when built with `obs_slog`.
/// - `lbfgs_mem`: history size; `None` uses
///   [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// Build options; numeric tolerances are validated by [`Tolerances::new`].
    ///
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] when `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    /// `tol_grad = 1e-6`, no cost tolerance, `max_iter = 300`, Armijo
    /// backtracking, quiet, default L-BFGS memory.
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) },
            line_searcher: LineSearcher::Backtracking,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules for the optimizer. At least one must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Normalized result of [`maximize`](super::maximize).
///
/// `value` is the best log-likelihood `ℓ(θ̂)`, i.e. `-NLL(θ̂)` for the
/// calibration model. `fn_evals` carries argmin's counters
/// (`cost_count`, `gradient_count`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// # Errors
    /// - [`OptError::SolverAborted`] when the solver stopped with
    ///   `SolverExit`, i.e. an error inside an iteration (a failed line
    ///   search, a model error at a trial point).
    /// - Propagates [`validate_theta_hat`] and [`validate_value`] failures.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        if let TerminationStatus::Terminated(TerminationReason::SolverExit(reason)) = &termination {
            return Err(OptError::SolverAborted { reason: reason.clone(), iterations });
        }
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        // Hitting the iteration cap or a timeout is a stop, not convergence.
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, format!("{reason:?}"))
            }
        };
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Tolerance validation rules.
    // - Line-search parsing.
    // - Outcome construction from solver state.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `Tolerances::new` must refuse a configuration with no stopping rule.
    //
    // Given
    // -----
    // - All three tolerances `None`.
    //
    // Expect
    // ------
    // - `OptError::NoTolerancesProvided`.
    fn tolerances_require_at_least_one_rule() {
        // Act
        let res = Tolerances::new(None, None, None);

        // Assert
        assert_eq!(res, Err(OptError::NoTolerancesProvided));
    }

    #[test]
    // Purpose
    // -------
    // Non-positive and non-finite tolerances are rejected with the matching
    // variant.
    //
    // Given
    // -----
    // - `tol_grad = -1.0`, then `tol_cost = NaN`, then `max_iter = 0`.
    //
    // Expect
    // ------
    // - `InvalidTolGrad`, `InvalidTolCost`, `InvalidMaxIter` respectively.
    fn tolerances_reject_invalid_values() {
        // Act
        let bad_grad = Tolerances::new(Some(-1.0), None, None);
        let bad_cost = Tolerances::new(None, Some(f64::NAN), None);
        let bad_iter = Tolerances::new(None, None, Some(0));

        // Assert
        assert!(matches!(bad_grad, Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(bad_cost, Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(bad_iter, Err(OptError::InvalidMaxIter { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively; unknown names fail.
    //
    // Given
    // -----
    // - `"hagerzhang"`, `"MORETHUENTE"`, `"BackTracking"`, `"wolfe"`.
    //
    // Expect
    // ------
    // - The first three parse; the last is `InvalidLineSearch`.
    fn line_searcher_parses_case_insensitively() {
        // Assert
        assert_eq!("hagerzhang".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MORETHUENTE".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert_eq!("BackTracking".parse::<LineSearcher>(), Ok(LineSearcher::Backtracking));
        assert!(matches!(
            "wolfe".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Zero L-BFGS memory is a configuration error.
    //
    // Given
    // -----
    // - Valid tolerances and `lbfgs_mem = Some(0)`.
    //
    // Expect
    // ------
    // - `OptError::InvalidLBFGSMem`.
    fn mle_options_reject_zero_memory() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).expect("valid tolerances");

        // Act
        let res = MLEOptions::new(tols, LineSearcher::MoreThuente, false, Some(0));

        // Assert
        assert!(matches!(res, Err(OptError::InvalidLBFGSMem { mem: 0, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Reaching the iteration cap is reported as not converged.
    //
    // Given
    // -----
    // - `Terminated(MaxItersReached)`.
    //
    // Expect
    // ------
    // - `converged == false`, status names the reason.
    fn optim_outcome_treats_iteration_cap_as_not_converged() {
        // Act
        let out = OptimOutcome::new(
            Some(array![0.0]),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            300,
            FnEvalMap::new(),
            None,
        )
        .expect("outcome should validate");

        // Assert
        assert!(!out.converged);
        assert_eq!(out.status, "MaxItersReached");
        assert_eq!(out.grad_norm, None);
    }

    #[test]
    // Purpose
    // -------
    // A terminated solver state maps to `converged = true` and carries the
    // gradient norm.
    //
    // Given
    // -----
    // - `theta_hat = [1, 2]`, value `-3.5`, gradient `[3, 4]`.
    //
    // Expect
    // ------
    // - `converged`, `grad_norm == Some(5.0)`, `iterations == 7`.
    fn optim_outcome_maps_termination_and_grad_norm() {
        // Arrange
        let status = TerminationStatus::Terminated(TerminationReason::SolverConverged);

        // Act
        let out = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            -3.5,
            status,
            7,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .expect("outcome should validate");

        // Assert
        assert!(out.converged);
        assert_eq!(out.iterations, 7);
        assert_eq!(out.grad_norm, Some(5.0));
        assert_eq!(out.value, -3.5);
    }

    #[test]
    // Purpose
    // -------
    // A solver that exits from inside an iteration is a failed run, not an
    // unconverged outcome.
    //
    // Given
    // -----
    // - `Terminated(SolverExit(..))` after one iteration, with an otherwise
    //   valid θ and value.
    //
    // Expect
    // ------
    // - `OptError::SolverAborted` carrying the reason and iteration count.
    fn optim_outcome_rejects_solver_exit() {
        // Arrange
        let reason = "Line search terminated with: 'Invalid gradient'".to_string();
        let status = TerminationStatus::Terminated(TerminationReason::SolverExit(reason.clone()));

        // Act
        let res = OptimOutcome::new(
            Some(array![1.8, 0.8, -3.0]),
            -250.0,
            status,
            1,
            FnEvalMap::new(),
            None,
        );

        // Assert
        assert_eq!(res, Err(OptError::SolverAborted { reason, iterations: 1 }));
    }
}
