//! centaur_calibration — NLL engine for hierarchical SUVR→CenTauR calibration.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the calibration likelihood to Python via the
//! `_centaur_calibration` extension module. When the `python-bindings`
//! feature is enabled, this module defines the Python-facing classes.
//!
//! Key behaviors
//! -------------
//! - Re-export the inner modules (`calibration`, `optimization`,
//!   `inference`) as the public crate surface.
//! - Define the `CentaurCalibration` `#[pyclass]`, which lets a Python-side
//!   optimizer call `nll` / `gradient` directly, or fit in Rust via `fit`.
//! - Define the `#[pymodule]` initializer for `_centaur_calibration`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue and error mapping.
//! - Data passed from Python is validated once, by `CalibrationData::new`,
//!   when the wrapper is constructed.
//!
//! Conventions
//! -----------
//! - θ follows the block layout documented in `calibration::core::shape`.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by `tests/integration_calibration_pipeline.rs`.

pub mod calibration;
pub mod inference;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::{
        core::{data::CalibrationData, params::CalibrationParams},
        errors::CalibrationError,
        models::calibration::CalibrationModel,
    },
    optimization::loglik_optimizer::{LogLikelihood, traits::OptimOutcome},
    utils::{extract_calibration_data, extract_calibration_options, extract_f64_array},
};

/// CentaurCalibration — Python-facing wrapper for [`CalibrationModel`].
///
/// Purpose
/// -------
/// Hold one validated calibration dataset and a model sized for it, so
/// Python code can evaluate the NLL and its gradient at arbitrary θ or fit
/// the model with the built-in L-BFGS optimizer.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `CentaurCalibration(suvr, x_tracer, x_centaur, x_h2h_subj, z_subj, v, v_subj, ...)`:
/// - `suvr`, `x_centaur`: 1-D float arrays of length `n`.
/// - `x_tracer`, `x_h2h_subj`, `z_subj`, `v`: 2-D float arrays with `n`
///   rows.
/// - `v_subj`: 2-D float array with one row per `z_subj` column.
/// - `tol_grad`, `tol_cost`, `max_iter`, `line_searcher`, `lbfgs_mem`,
///   `verbose`: optimizer configuration. `line_searcher` is one of
///   `"backtracking"` (default), `"morethuente"` or `"hagerzhang"`.
/// - `scale_floor`: optional floor; when given, standard deviations with
///   magnitude below it are replaced by it.
///
/// Notes
/// -----
/// - Native Rust callers should use [`CalibrationModel`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "centaur_calibration")]
pub struct CentaurCalibration {
    data: CalibrationData,
    inner: CalibrationModel,
}

#[cfg(feature = "python-bindings")]
impl CentaurCalibration {
    fn theta_from_py<'py>(py: Python<'py>, theta: &Bound<'py, PyAny>) -> PyResult<Array1<f64>> {
        let theta_arr = extract_f64_array(py, theta)?;
        let theta_slice = theta_arr.as_slice().map_err(|_| {
            PyValueError::new_err("theta must be a 1-D contiguous float64 array or sequence")
        })?;
        Ok(Array1::from(theta_slice.to_vec()))
    }

    fn params_from_py<'py>(
        &self, py: Python<'py>, theta: &Bound<'py, PyAny>,
    ) -> PyResult<CalibrationParams> {
        let theta_vec = Self::theta_from_py(py, theta)?;
        Ok(CalibrationParams::from_theta(theta_vec.view(), &self.inner.shape)?)
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl CentaurCalibration {
    #[new]
    #[pyo3(
        signature = (
            suvr,
            x_tracer,
            x_centaur,
            x_h2h_subj,
            z_subj,
            v,
            v_subj,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
            verbose = false,
            scale_floor = None,
        ),
        text_signature = "(suvr, x_tracer, x_centaur, x_h2h_subj, z_subj, v, v_subj, /, \
                          tol_grad=None, tol_cost=None, max_iter=None, line_searcher=None, \
                          lbfgs_mem=None, verbose=False, scale_floor=None)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new<'py>(
        py: Python<'py>, suvr: &Bound<'py, PyAny>, x_tracer: &Bound<'py, PyAny>,
        x_centaur: &Bound<'py, PyAny>, x_h2h_subj: &Bound<'py, PyAny>, z_subj: &Bound<'py, PyAny>,
        v: &Bound<'py, PyAny>, v_subj: &Bound<'py, PyAny>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>, verbose: bool, scale_floor: Option<f64>,
    ) -> PyResult<Self> {
        let data =
            extract_calibration_data(py, suvr, x_tracer, x_centaur, x_h2h_subj, z_subj, v, v_subj)?;
        let options = extract_calibration_options(
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
            verbose,
            scale_floor,
        )?;
        let inner = CalibrationModel::for_data(&data, options);
        Ok(CentaurCalibration { data, inner })
    }

    /// Length of θ expected by `nll`, `gradient` and `fit`.
    #[getter]
    pub fn n_params(&self) -> usize {
        self.inner.shape.theta_len()
    }

    /// Negative log-likelihood at `theta`. May be non-finite.
    #[pyo3(text_signature = "(self, theta)")]
    pub fn nll<'py>(&self, py: Python<'py>, theta: &Bound<'py, PyAny>) -> PyResult<f64> {
        let params = self.params_from_py(py, theta)?;
        Ok(self.inner.nll(&params, &self.data)?)
    }

    /// Gradient of the NLL at `theta`, in θ order.
    #[pyo3(text_signature = "(self, theta)")]
    pub fn gradient<'py>(&self, py: Python<'py>, theta: &Bound<'py, PyAny>) -> PyResult<Vec<f64>> {
        let params = self.params_from_py(py, theta)?;
        Ok(self.inner.nll_grad(&params, &self.data)?.to_theta().to_vec())
    }

    #[pyo3(text_signature = "(self, theta0)")]
    pub fn fit<'py>(&mut self, py: Python<'py>, theta0: &Bound<'py, PyAny>) -> PyResult<()> {
        let theta_vec = Self::theta_from_py(py, theta0)?;
        self.inner.fit(theta_vec, &self.data).map_err(CalibrationError::from)?;
        Ok(())
    }

    /// Observed-information standard errors at θ̂ (log scale for variances).
    pub fn standard_errors(&self) -> PyResult<Vec<f64>> {
        let se = self.inner.standard_errors(&self.data).map_err(CalibrationError::from)?;
        Ok(se.to_vec())
    }

    /// Per-observation `(slope, intercept, centaur, random, yfit, sd)` at θ̂.
    pub fn observation_fits(&self) -> PyResult<Vec<(f64, f64, f64, f64, f64, f64)>> {
        let breakdown =
            crate::calibration::models::model_internals::fitted_breakdown(&self.inner, &self.data)?;
        Ok(breakdown
            .observations
            .iter()
            .map(|o| (o.slope, o.intercept, o.centaur, o.random, o.yfit, o.sd))
            .collect())
    }

    #[getter]
    pub fn results(&self) -> PyResult<CalibrationOptimOutcome> {
        match &self.inner.results {
            Some(outcome) => Ok(CalibrationOptimOutcome { inner: outcome.clone() }),
            None => Err(CalibrationError::ModelNotFitted.into()),
        }
    }

    #[getter]
    pub fn theta_hat(&self) -> PyResult<Vec<f64>> {
        match &self.inner.results {
            Some(outcome) => Ok(outcome.theta_hat.to_vec()),
            None => Err(CalibrationError::ModelNotFitted.into()),
        }
    }

    #[getter]
    pub fn converged(&self) -> PyResult<bool> {
        match &self.inner.results {
            Some(outcome) => Ok(outcome.converged),
            None => Err(CalibrationError::ModelNotFitted.into()),
        }
    }

    /// Log-likelihood `-NLL` at `theta`, the quantity `fit` maximizes.
    #[pyo3(text_signature = "(self, theta)")]
    pub fn loglik<'py>(&self, py: Python<'py>, theta: &Bound<'py, PyAny>) -> PyResult<f64> {
        let theta_vec = Self::theta_from_py(py, theta)?;
        let value = self.inner.value(&theta_vec, &self.data).map_err(CalibrationError::from)?;
        Ok(value)
    }
}

#[cfg(feature = "python-bindings")]
#[pyclass(module = "centaur_calibration")]
pub struct CalibrationOptimOutcome {
    pub inner: OptimOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl CalibrationOptimOutcome {
    #[getter]
    pub fn theta_hat(&self) -> Vec<f64> {
        self.inner.theta_hat.to_vec()
    }

    /// Log-likelihood at θ̂ (negated NLL).
    #[getter]
    pub fn value(&self) -> f64 {
        self.inner.value
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn grad_norm(&self) -> Option<f64> {
        self.inner.grad_norm
    }

    #[getter]
    pub fn fn_evals(&self) -> Vec<(String, u64)> {
        self.inner.fn_evals.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
}

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _centaur_calibration<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<CentaurCalibration>()?;
    m.add_class::<CalibrationOptimOutcome>()?;
    Ok(())
}
