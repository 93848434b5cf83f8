//! Errors for the SUVR→CenTauR calibration engine.
//!
//! [`CalibrationError`] covers construction-time problems: empty or
//! non-finite data, design matrices whose row counts disagree, parameter
//! blocks of the wrong length, and fitting-state misuse. It never encodes a
//! numeric failure of the likelihood itself; a non-positive scale shows up
//! as a non-finite NLL, not as an error.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Field names in messages match the data arguments (`suvr`, `x_tracer`,
//!   `x_centaur`, `x_h2h_subj`, `z_subj`, `v`, `v_subj`).
//! - Optimizer/backend errors are normalized to
//!   [`CalibrationError::OptimizationFailed`] with a human-readable status.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{calibration::core::shape::ParamBlock, optimization::errors::OptError};

/// Result alias for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    // ---- Input/data validation ----
    /// No SUVR observations.
    EmptyObservations,

    /// An observation-level array has the wrong number of rows.
    RowCountMismatch { field: &'static str, expected: usize, actual: usize },

    /// `v_subj` must have one row per anchor subject (`z_subj` column).
    AnchorRowMismatch { expected: usize, actual: usize },

    /// A data entry is NaN/±inf.
    NonFiniteData { field: &'static str, row: usize, col: usize, value: f64 },

    // ---- Parameters ----
    /// Flat θ has the wrong total length.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// θ entries must be finite.
    NonFiniteTheta { index: usize, value: f64 },

    /// A named parameter block has the wrong length.
    BlockLengthMismatch { block: ParamBlock, expected: usize, actual: usize },

    /// Parameters were built for a different data shape.
    ShapeMismatch { what: &'static str, expected: usize, actual: usize },

    // ---- Options ----
    /// Floor for `ScaleMode::Floored` must be finite and > 0.
    InvalidScaleFloor { value: f64 },

    // ---- Estimation / optimizer ----
    /// Optimizer failed; include a human-readable status/reason.
    OptimizationFailed { status: String },

    /// Model hasn't been fitted yet.
    ModelNotFitted,
}

impl std::error::Error for CalibrationError {}

impl std::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            CalibrationError::EmptyObservations => {
                write!(f, "SUVR vector is empty.")
            }
            CalibrationError::RowCountMismatch { field, expected, actual } => {
                write!(f, "{field} must have {expected} rows (one per observation); got {actual}")
            }
            CalibrationError::AnchorRowMismatch { expected, actual } => {
                write!(
                    f,
                    "v_subj must have {expected} rows (one per anchor subject in z_subj); got {actual}"
                )
            }
            CalibrationError::NonFiniteData { field, row, col, value } => {
                write!(f, "{field}[{row}, {col}] is non-finite: {value}")
            }
            // ---- Parameters ----
            CalibrationError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, got {actual}")
            }
            CalibrationError::NonFiniteTheta { index, value } => {
                write!(f, "Theta input at index {index} must be finite, got {value}")
            }
            CalibrationError::BlockLengthMismatch { block, expected, actual } => {
                write!(f, "{} length mismatch: expected {expected}, got {actual}", block.name())
            }
            CalibrationError::ShapeMismatch { what, expected, actual } => {
                write!(f, "Shape mismatch for {what}: parameters expect {expected}, data has {actual}")
            }
            // ---- Options ----
            CalibrationError::InvalidScaleFloor { value } => {
                write!(f, "Scale floor must be finite and > 0; got: {value}")
            }
            // ---- Estimation / optimizer ----
            CalibrationError::OptimizationFailed { status } => {
                write!(f, "Optimizer failed with status: {status}")
            }
            CalibrationError::ModelNotFitted => {
                write!(f, "Model hasn't been fitted yet.")
            }
        }
    }
}

/// Convert a [`CalibrationError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<CalibrationError> for PyErr {
    fn from(err: CalibrationError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<OptError> for CalibrationError {
    fn from(err: OptError) -> CalibrationError {
        match err {
            OptError::ThetaLengthMismatch { expected, actual } => {
                CalibrationError::ThetaLengthMismatch { expected, actual }
            }
            OptError::InvalidThetaInput { index, value } => {
                CalibrationError::NonFiniteTheta { index, value }
            }
            OptError::ModelNotFitted => CalibrationError::ModelNotFitted,
            other => CalibrationError::OptimizationFailed { status: other.to_string() },
        }
    }
}
