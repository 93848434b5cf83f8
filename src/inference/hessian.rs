//! inference::hessian — observed-information covariance and standard errors.
//!
//! Purpose
//! -------
//! Turn the gradient of a negative log-likelihood into a θ-space covariance
//! estimate at the MLE. The observed information `J(θ̂)` is the numerical
//! Jacobian of the NLL gradient; its Moore–Penrose pseudoinverse is the
//! classical covariance of θ̂.
//!
//! Key behaviors
//! -------------
//! - [`compute_hessian`] builds a finite, symmetrized `J(θ̂)`.
//! - `J(θ̂)` is copied into a `nalgebra::DMatrix` and decomposed with
//!   `symmetric_eigen`; eigenvalues at or below [`EIGEN_EPS`] are dropped,
//!   so weakly identified directions (an anchor subject whose offset is
//!   pinned only by its prior, a variance component with no data) do not
//!   blow up the whole matrix.
//! - [`calc_covariance`] returns the full pseudoinverse;
//!   [`calc_standard_errors`] returns the square roots of its diagonal.
//!
//! Conventions
//! -----------
//! - `grad_fn` is the gradient of the summed NLL, not an average, so the
//!   covariance needs no further scaling by `n`.
//! - Log-variance components stay on the log scale here; the calibration
//!   model applies the delta method for `σ`.
//! - Errors are reported via [`OptResult<T>`].
use crate::optimization::{
    errors::OptResult, loglik_optimizer::finite_diff::compute_hessian,
    numerical_stability::transformations::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// Pseudoinverse of the observed information at `theta_hat`.
///
/// # Errors
/// Propagates [`compute_hessian`] failures (non-finite curvature).
pub fn calc_covariance<F: Fn(&Array1<f64>) -> Array1<f64>>(
    grad_fn: &F, theta_hat: &Array1<f64>,
) -> OptResult<Array2<f64>> {
    let obs_info = compute_hessian(grad_fn, theta_hat)?;
    Ok(pseudo_inverse(to_dmatrix(&obs_info)))
}

/// Classical standard errors `sqrt(diag(J(θ̂)⁺))`.
///
/// # Errors
/// Propagates [`compute_hessian`] failures (non-finite curvature).
pub fn calc_standard_errors<F: Fn(&Array1<f64>) -> Array1<f64>>(
    grad_fn: &F, theta_hat: &Array1<f64>,
) -> OptResult<Array1<f64>> {
    let cov = calc_covariance(grad_fn, theta_hat)?;
    Ok(cov.diag().mapv(|v| v.max(0.0).sqrt()))
}

// ---- Helper methods ----

fn to_dmatrix(obs_info: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(obs_info.nrows(), obs_info.ncols(), |i, j| obs_info[[i, j]])
}

fn pseudo_inverse(obs_info: DMatrix<f64>) -> Array2<f64> {
    let n = obs_info.nrows();
    let eigen = obs_info.symmetric_eigen();
    let q = eigen.eigenvectors;
    let mut cov = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        for i in 0..n {
            let qi = q[(i, k)] / lambda;
            for j in 0..n {
                cov[[i, j]] += qi * q[(j, k)];
            }
        }
    }
    cov
}
