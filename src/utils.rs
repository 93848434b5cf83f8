//! Python-side argument extraction for the calibration bindings.
//!
//! Every helper converts loosely typed Python input (NumPy arrays, pandas
//! objects, nested sequences) into owned `ndarray` values or validated option
//! types, mapping failures to `TypeError` / `ValueError`.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::{
        core::{data::CalibrationData, options::CalibrationOptions, variance::ScaleMode},
        errors::CalibrationError,
    },
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArray2,
    PyUntypedArrayMethods, // .shape(), .is_c_contiguous()
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Owned copy of a 1-D float input.
#[cfg(feature = "python-bindings")]
pub fn extract_vector<'py>(
    py: Python<'py>, field: &str, raw: &Bound<'py, PyAny>,
) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{field} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(Array1::from(slice.to_vec()))
}

/// Owned copy of a 2-D float input.
///
/// Accepts a C-contiguous float64 ndarray, anything whose `to_numpy()`
/// returns one (pandas `DataFrame`), or a rectangular sequence of rows.
/// Non-contiguous arrays are read row by row through the sequence path.
#[cfg(feature = "python-bindings")]
pub fn extract_matrix<'py>(
    _py: Python<'py>, field: &str, raw: &Bound<'py, PyAny>,
) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw.extract::<PyReadonlyArray2<f64>>() {
        if let Some(m) = contiguous_to_array2(&arr_ro) {
            return Ok(m);
        }
    }

    if let Ok(obj) = raw.call_method("to_numpy", (), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            if let Some(m) = contiguous_to_array2(&frame_ro) {
                return Ok(m);
            }
        }
    }

    let rows: Vec<Vec<f64>> = raw.extract().map_err(|_| {
        PyTypeError::new_err(format!(
            "{field} must be a 2-D numpy.ndarray, pandas.DataFrame, or sequence of float64 rows"
        ))
    })?;
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(PyTypeError::new_err(format!("{field} rows must all have the same length")));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| PyTypeError::new_err(format!("{field}: {e}")))
}

#[cfg(feature = "python-bindings")]
fn contiguous_to_array2(arr: &PyReadonlyArray2<'_, f64>) -> Option<Array2<f64>> {
    if !arr.is_c_contiguous() {
        return None;
    }
    let slice = arr.as_slice().ok()?;
    let shape = arr.shape();
    Array2::from_shape_vec((shape[0], shape[1]), slice.to_vec()).ok()
}

#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn extract_calibration_data<'py>(
    py: Python<'py>, suvr: &Bound<'py, PyAny>, x_tracer: &Bound<'py, PyAny>,
    x_centaur: &Bound<'py, PyAny>, x_h2h_subj: &Bound<'py, PyAny>, z_subj: &Bound<'py, PyAny>,
    v: &Bound<'py, PyAny>, v_subj: &Bound<'py, PyAny>,
) -> PyResult<CalibrationData> {
    let data = CalibrationData::new(
        extract_vector(py, "suvr", suvr)?,
        extract_matrix(py, "x_tracer", x_tracer)?,
        extract_vector(py, "x_centaur", x_centaur)?,
        extract_matrix(py, "x_h2h_subj", x_h2h_subj)?,
        extract_matrix(py, "z_subj", z_subj)?,
        extract_matrix(py, "v", v)?,
        extract_matrix(py, "v_subj", v_subj)?,
    )?;
    Ok(data)
}

#[cfg(feature = "python-bindings")]
pub fn extract_calibration_options(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, verbose: bool, scale_floor: Option<f64>,
) -> PyResult<CalibrationOptions> {
    use std::str::FromStr;

    // No stopping rule given: fall back to the optimizer defaults.
    let tols = if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
        MLEOptions::default().tols
    } else {
        // Tolerances::new -> OptResult<Tolerances> -> CalibrationError -> PyErr
        Tolerances::new(tol_grad, tol_cost, max_iter).map_err(CalibrationError::from)?
    };

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(CalibrationError::from)?,
        None => LineSearcher::Backtracking,
    };

    let mle_opts =
        MLEOptions::new(tols, ls, verbose, lbfgs_mem).map_err(CalibrationError::from)?;

    let scale_mode = match scale_floor {
        Some(floor) => ScaleMode::floored(floor)?,
        None => ScaleMode::Unguarded,
    };

    Ok(CalibrationOptions::new(mle_opts, scale_mode))
}
