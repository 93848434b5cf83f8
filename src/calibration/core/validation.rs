//! Validation helpers for calibration data and parameter vectors.
//!
//! These run once per construction (data) or once per fit (θ₀). The
//! likelihood hot path never calls them; by the time `nll` runs, shapes are
//! known to agree.
use crate::calibration::{
    core::shape::CalibrationShape,
    errors::{CalibrationError, CalibrationResult},
};
use ndarray::{ArrayView1, ArrayView2};

/// Reject the first NaN/±inf in a vector, reported as column 0.
///
/// # Errors
/// [`CalibrationError::NonFiniteData`].
pub fn validate_finite_vector(field: &'static str, values: ArrayView1<f64>) -> CalibrationResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(row) => Err(CalibrationError::NonFiniteData { field, row, col: 0, value: values[row] }),
        None => Ok(()),
    }
}

/// Reject the first NaN/±inf in a matrix, in row-major order.
///
/// # Errors
/// [`CalibrationError::NonFiniteData`].
pub fn validate_finite_matrix(field: &'static str, values: ArrayView2<f64>) -> CalibrationResult<()> {
    for ((row, col), &value) in values.indexed_iter() {
        if !value.is_finite() {
            return Err(CalibrationError::NonFiniteData { field, row, col, value });
        }
    }
    Ok(())
}

/// # Errors
/// [`CalibrationError::RowCountMismatch`] when `actual != n`.
pub fn validate_row_count(field: &'static str, n: usize, actual: usize) -> CalibrationResult<()> {
    if actual != n {
        return Err(CalibrationError::RowCountMismatch { field, expected: n, actual });
    }
    Ok(())
}

/// Check a flat θ against the model shape.
///
/// # Errors
/// - [`CalibrationError::ThetaLengthMismatch`] if `theta.len()` is not
///   `shape.theta_len()`.
/// - [`CalibrationError::NonFiniteTheta`] for the first NaN/±inf entry.
pub fn validate_theta(theta: ArrayView1<f64>, shape: &CalibrationShape) -> CalibrationResult<()> {
    let expected = shape.theta_len();
    if theta.len() != expected {
        return Err(CalibrationError::ThetaLengthMismatch { expected, actual: theta.len() });
    }
    if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
        return Err(CalibrationError::NonFiniteTheta { index, value: theta[index] });
    }
    Ok(())
}
