//! Entry point: maximize a [`LogLikelihood`] with L-BFGS.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{
            build_optimizer_backtracking, build_optimizer_hager_zhang,
            build_optimizer_more_thuente,
        },
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `ℓ(θ)` starting from `theta0`.
///
/// Runs `f.check` on the start point, requires `ℓ(θ₀)` to be finite, wraps
/// `(f, data)` in an [`ArgMinAdapter`] so argmin minimizes `-ℓ(θ)`, builds
/// L-BFGS with the line search named in `opts`, and hands off to
/// [`run_lbfgs`].
///
/// # Errors
/// - Whatever `f.check` rejects.
/// - [`OptError::NonFiniteCost`] when `ℓ(θ₀)` is NaN or ±∞.
/// - Builder errors (invalid tolerances reaching argmin).
/// - Solver failures, including [`OptError::SolverAborted`] when an
///   iteration fails (a model error, or a non-finite gradient at a trial
///   point reached by a Wolfe-type line search).
///
/// # Example
/// ```
/// use centaur_calibration::optimization::errors::OptResult;
/// use centaur_calibration::optimization::loglik_optimizer::{
///     Cost, Grad, LogLikelihood, MLEOptions, Theta, maximize,
/// };
/// use ndarray::array;
///
/// struct Peak;
/// impl LogLikelihood for Peak {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
///         Ok(-theta.mapv(|t| (t - 0.5).powi(2)).sum())
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
///     fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
///         Ok(theta.mapv(|t| -2.0 * (t - 0.5)))
///     }
/// }
///
/// let out = maximize(&Peak, array![3.0, -1.0], &(), &MLEOptions::default())?;
/// assert!((out.theta_hat[0] - 0.5).abs() < 1e-4);
/// # Ok::<(), centaur_calibration::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let value0 = f.value(&theta0, data)?;
    if !value0.is_finite() {
        return Err(OptError::NonFiniteCost { value: value0 });
    }
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::Backtracking => {
            let solver = build_optimizer_backtracking(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}
