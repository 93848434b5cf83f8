//! loglik_optimizer::types — numeric aliases and pre-wired solver types.
//!
//! Every optimizer module speaks in these aliases rather than raw `ndarray`
//! or argmin generics. `Theta` is the flat calibration parameter vector laid
//! out by `CalibrationShape`; `Cost` is a scalar on whichever scale the
//! caller is working (log-likelihood for [`LogLikelihood`], NLL inside the
//! adapter).
//!
//! [`LogLikelihood`]: super::LogLikelihood
use argmin::solver::{
    linesearch::{
        BacktrackingLineSearch, HagerZhangLineSearch, MoreThuenteLineSearch,
        condition::ArmijoCondition,
    },
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Flat parameter vector θ.
pub type Theta = Array1<f64>;

/// Gradient with the same layout as [`Theta`].
pub type Grad = Array1<f64>;

/// Dense `n × n` second-derivative matrix, `n = theta.len()`.
pub type Hessian = Array2<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// argmin function-evaluation counters keyed by name (`"cost_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Sufficient-decrease constant of the Armijo condition.
pub const ARMIJO_C: f64 = 1e-4;

/// Step contraction factor of the backtracking line search.
pub const BACKTRACKING_RHO: f64 = 0.5;

pub type BacktrackingLS = BacktrackingLineSearch<Theta, Grad, ArmijoCondition<Cost>, Cost>;
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsBacktracking = LBFGS<BacktrackingLS, Theta, Grad, Cost>;
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
