//! Observation and design-matrix container for calibration fits.
//!
//! Purpose
//! -------
//! Hold one calibration dataset: observed SUVR values, the baseline CenTauR
//! value for each observation, and the five design matrices that route
//! parameters to observations and anchor subjects. All problem dimensions
//! are derived from these shapes and checked once, here.
//!
//! Key behaviors
//! -------------
//! - [`CalibrationData::new`] checks that every observation-level array has
//!   `n = suvr.len()` rows, that `v_subj` has one row per `z_subj` column,
//!   and that every entry is finite.
//! - [`CalibrationData::shape`] returns the [`CalibrationShape`] the rest of
//!   the engine uses for θ layout.
//!
//! Invariants & assumptions
//! ------------------------
//! - `n > 0`. Zero-width matrices are fine: a dataset with no head-to-head
//!   groups has `x_h2h_subj` of shape `n × 0`, one with no anchor subjects
//!   has `z_subj` of shape `n × 0` and `v_subj` of shape `0 × k`.
//! - Design entries are NOT sign-checked. A variance design row with
//!   negative entries can produce a non-positive scale; that is a property
//!   of the parameter region, surfaced through the NLL.
//!
//! Conventions
//! -----------
//! - Rows are observations (or anchor subjects for `v_subj`); columns are
//!   parameter-block entries.
//! - Data is immutable after construction; every likelihood evaluation
//!   borrows it.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the happy path, the empty series, each row-count
//!   check, the anchor-row check, and non-finite entries.
use crate::calibration::{
    core::{
        shape::CalibrationShape,
        validation::{validate_finite_matrix, validate_finite_vector, validate_row_count},
    },
    errors::{CalibrationError, CalibrationResult},
};
use ndarray::{Array1, Array2};

/// `CalibrationData` — SUVR observations plus design matrices.
///
/// Fields
/// ------
/// - `suvr`: `Array1<f64>`, length `n`. Observed SUVR values.
/// - `x_tracer`: `Array2<f64>`, `n × n_tracer`. Tracer design; usually
///   one-hot, but any real weights blend tracer slopes and intercepts.
/// - `x_centaur`: `Array1<f64>`, length `n`. Baseline CenTauR value of each
///   observation's group.
/// - `x_h2h_subj`: `Array2<f64>`, `n × n_h2h`. Head-to-head fixed-effect
///   design.
/// - `z_subj`: `Array2<f64>`, `n × n_anchor`. Random-effect design; an
///   all-zero row means the observation has no anchor subject.
/// - `v`: `Array2<f64>`, `n × n_var`. Residual-variance design.
/// - `v_subj`: `Array2<f64>`, `n_anchor × n_anchor_var`. Subject-variance
///   design.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationData {
    pub suvr: Array1<f64>,
    pub x_tracer: Array2<f64>,
    pub x_centaur: Array1<f64>,
    pub x_h2h_subj: Array2<f64>,
    pub z_subj: Array2<f64>,
    pub v: Array2<f64>,
    pub v_subj: Array2<f64>,
}

impl CalibrationData {
    /// Construct validated calibration data.
    ///
    /// Errors
    /// ------
    /// - `CalibrationError::EmptyObservations`
    ///   `suvr` is empty.
    /// - `CalibrationError::RowCountMismatch { field, .. }`
    ///   `x_tracer`, `x_centaur`, `x_h2h_subj`, `z_subj` or `v` does not have
    ///   `suvr.len()` rows.
    /// - `CalibrationError::AnchorRowMismatch`
    ///   `v_subj.nrows() != z_subj.ncols()`.
    /// - `CalibrationError::NonFiniteData { field, row, col, value }`
    ///   First NaN/±inf entry, checked field by field in argument order.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::{array, Array2};
    /// # use centaur_calibration::calibration::core::data::CalibrationData;
    /// let data = CalibrationData::new(
    ///     array![5.0, 3.1],
    ///     array![[1.0], [1.0]],
    ///     array![2.0, 1.0],
    ///     Array2::zeros((2, 0)),
    ///     Array2::zeros((2, 0)),
    ///     array![[1.0], [1.0]],
    ///     Array2::zeros((0, 0)),
    /// )?;
    /// assert_eq!(data.shape().theta_len(), 3);
    /// # Ok::<(), centaur_calibration::calibration::errors::CalibrationError>(())
    /// ```
    pub fn new(
        suvr: Array1<f64>, x_tracer: Array2<f64>, x_centaur: Array1<f64>, x_h2h_subj: Array2<f64>,
        z_subj: Array2<f64>, v: Array2<f64>, v_subj: Array2<f64>,
    ) -> CalibrationResult<Self> {
        let n = suvr.len();
        if n == 0 {
            return Err(CalibrationError::EmptyObservations);
        }
        validate_row_count("x_tracer", n, x_tracer.nrows())?;
        validate_row_count("x_centaur", n, x_centaur.len())?;
        validate_row_count("x_h2h_subj", n, x_h2h_subj.nrows())?;
        validate_row_count("z_subj", n, z_subj.nrows())?;
        validate_row_count("v", n, v.nrows())?;
        if v_subj.nrows() != z_subj.ncols() {
            return Err(CalibrationError::AnchorRowMismatch {
                expected: z_subj.ncols(),
                actual: v_subj.nrows(),
            });
        }

        validate_finite_vector("suvr", suvr.view())?;
        validate_finite_matrix("x_tracer", x_tracer.view())?;
        validate_finite_vector("x_centaur", x_centaur.view())?;
        validate_finite_matrix("x_h2h_subj", x_h2h_subj.view())?;
        validate_finite_matrix("z_subj", z_subj.view())?;
        validate_finite_matrix("v", v.view())?;
        validate_finite_matrix("v_subj", v_subj.view())?;

        Ok(CalibrationData { suvr, x_tracer, x_centaur, x_h2h_subj, z_subj, v, v_subj })
    }

    /// Dimensions implied by the design matrices.
    pub fn shape(&self) -> CalibrationShape {
        CalibrationShape {
            n: self.suvr.len(),
            n_tracer: self.x_tracer.ncols(),
            n_h2h: self.x_h2h_subj.ncols(),
            n_anchor: self.z_subj.ncols(),
            n_var: self.v.ncols(),
            n_anchor_var: self.v_subj.ncols(),
        }
    }
}
