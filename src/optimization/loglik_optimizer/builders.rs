//! loglik_optimizer::builders — L-BFGS construction.
//!
//! Builders apply the history size and the gradient / cost tolerances from
//! [`MLEOptions`]. The start point and iteration cap are runtime concerns
//! and are applied by [`run_lbfgs`](super::run::run_lbfgs).
use argmin::solver::{linesearch::condition::ArmijoCondition, quasinewton::LBFGS};

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            ARMIJO_C, BACKTRACKING_RHO, BacktrackingLS, Cost, DEFAULT_LBFGS_MEM, Grad,
            HagerZhangLS, LbfgsBacktracking, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS,
            Theta,
        },
    },
};

/// L-BFGS with an Armijo backtracking line search.
///
/// Only trial costs are evaluated inside the line search, so a trial point
/// with an infinite cost is simply contracted by `BACKTRACKING_RHO`.
///
/// # Errors
/// Tolerances or line-search constants argmin refuses, converted to
/// `OptError`.
pub fn build_optimizer_backtracking(opts: &MLEOptions) -> OptResult<LbfgsBacktracking> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let linesearch = BacktrackingLS::new(ArmijoCondition::new(ARMIJO_C)?).rho(BACKTRACKING_RHO)?;
    configure_lbfgs(LbfgsBacktracking::new(linesearch, mem), opts)
}

/// L-BFGS with Hager–Zhang line search.
///
/// # Errors
/// Tolerances argmin refuses, converted to `OptError`.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search.
///
/// # Errors
/// Tolerances argmin refuses, converted to `OptError`.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply whichever of `tol_grad` / `tol_cost` is set; argmin defaults
/// stay in place for the rest.
///
/// # Errors
/// Tolerances argmin refuses, converted to `OptError`.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
