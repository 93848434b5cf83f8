//! Integration tests for the SUVR→CenTauR calibration pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end calibration path through the public API: from
//!   validated design matrices, through model construction and evaluation
//!   of the NLL and its gradient, to MLE fitting, standard errors, and the
//!   per-term breakdown.
//! - Exercise realistic two-tracer designs with head-to-head subjects and
//!   anchor subjects rather than single-row toy cases only.
//!
//! Coverage
//! --------
//! - `calibration::core`:
//!   - `CalibrationData` construction and shape derivation.
//!   - `ScaleMode` unguarded vs floored evaluation.
//! - `calibration::models::calibration::CalibrationModel`:
//!   - NLL, analytic gradient, fit, standard errors, scale estimates.
//! - `calibration::models::model_internals`:
//!   - Additivity of the NLL breakdown at θ̂.
//! - `optimization::loglik_optimizer`:
//!   - L-BFGS via `MLEOptions` and `Tolerances`, and central differences.
//!
//! Exclusions
//! ----------
//! - Closed-form checks of the density and the accumulators; these are
//!   covered by unit tests.
//! - Python bindings.
use centaur_calibration::{
    calibration::{
        core::{
            data::CalibrationData, options::CalibrationOptions, params::CalibrationParams,
            variance::ScaleMode,
        },
        models::{calibration::CalibrationModel, model_internals::fitted_breakdown},
    },
    optimization::{
        errors::OptError,
        loglik_optimizer::{
            LogLikelihood, MLEOptions, Tolerances, finite_diff::central_fd_gradient,
            traits::LineSearcher,
        },
    },
};
use ndarray::{Array1, Array2, array, s};

const TRUE_SLOPES: [f64; 2] = [1.0, 1.6];
const TRUE_INTERCEPTS: [f64; 2] = [0.0, -0.3];
const TRUE_H2H: [f64; 2] = [0.8, 2.1];
const REFERENCE_CENTAUR: [f64; 6] = [0.2, 0.5, 0.9, 1.4, 2.0, 2.7];

/// Purpose
/// -------
/// Build a two-tracer head-to-head design with known-CenTauR reference
/// subjects and no anchor subjects.
///
/// Layout
/// ------
/// - Six reference subjects scanned with both tracers (rows `0..12`), with
///   baseline CenTauR from `REFERENCE_CENTAUR` and no h2h column.
/// - Two head-to-head subjects scanned with both tracers (rows `12..16`),
///   with baseline 0 and one h2h column each.
/// - `V` is a one-hot tracer indicator, so each tracer has its own residual
///   scale.
/// - SUVR follows `slope·centaur + intercept` plus a deterministic
///   perturbation of amplitude `noise`.
///
/// Invariants
/// ----------
/// - Every row is finite, so `CalibrationData::new` should succeed.
fn make_h2h_data(noise: f64) -> CalibrationData {
    let mut rows: Vec<(usize, f64, Option<usize>)> = Vec::new();
    for &c in REFERENCE_CENTAUR.iter() {
        for tracer in 0..2 {
            rows.push((tracer, c, None));
        }
    }
    for subj in 0..2 {
        for tracer in 0..2 {
            rows.push((tracer, 0.0, Some(subj)));
        }
    }

    let n = rows.len();
    let mut suvr = Array1::zeros(n);
    let mut x_tracer = Array2::zeros((n, 2));
    let mut x_centaur = Array1::zeros(n);
    let mut x_h2h = Array2::zeros((n, 2));
    let mut v = Array2::zeros((n, 2));
    for (i, &(tracer, c, h2h)) in rows.iter().enumerate() {
        let centaur = c + h2h.map_or(0.0, |s| TRUE_H2H[s]);
        let wiggle = noise * (1.3 * i as f64 + 0.4).sin();
        suvr[i] = TRUE_SLOPES[tracer] * centaur + TRUE_INTERCEPTS[tracer] + wiggle;
        x_tracer[[i, tracer]] = 1.0;
        x_centaur[i] = c;
        if let Some(s) = h2h {
            x_h2h[[i, s]] = 1.0;
        }
        v[[i, tracer]] = 1.0;
    }

    CalibrationData::new(
        suvr,
        x_tracer,
        x_centaur,
        x_h2h,
        Array2::zeros((n, 0)),
        v,
        Array2::zeros((0, 0)),
    )
    .expect("CalibrationData::new should accept a finite h2h design")
}

/// Purpose
/// -------
/// Build a small two-tracer design with three anchor subjects sharing one
/// subject-variance component, for evaluation-only checks.
fn make_anchor_data() -> CalibrationData {
    CalibrationData::new(
        array![0.9, 1.4, 1.6, 2.5, 2.2, 3.3],
        array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]],
        array![0.8, 0.8, 1.5, 1.5, 2.1, 2.1],
        array![[0.0], [0.0], [0.0], [0.0], [1.0], [1.0]],
        array![
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0]
        ],
        array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]],
        array![[1.0], [1.0], [1.0]],
    )
    .expect("CalibrationData::new should accept a finite anchor design")
}

/// θ for `make_anchor_data()`: slopes, intercepts, h2h, offsets, log σ,
/// log σ_subj.
fn anchor_theta() -> Array1<f64> {
    array![1.1, 1.5, 0.05, -0.2, 0.1, 0.04, -0.03, 0.02, -1.2, -0.8, -1.5]
}

/// Purpose
/// -------
/// Optimizer settings used by the fitting tests.
///
/// Configuration
/// -------------
/// - `tol_grad = Some(1e-6)`, `tol_cost = Some(1e-12)`, `max_iter = Some(500)`.
/// - Line search: `LineSearcher::Backtracking`, default L-BFGS memory.
/// - `ScaleMode::Unguarded`.
fn fit_options() -> CalibrationOptions {
    let tols = Tolerances::new(Some(1e-6), Some(1e-12), Some(500))
        .expect("Tolerances::new should accept positive tolerances");
    let mle_opts = MLEOptions::new(tols, LineSearcher::Backtracking, false, None)
        .expect("MLEOptions::new should succeed with reasonable tolerances");
    CalibrationOptions::new(mle_opts, ScaleMode::Unguarded)
}

/// Purpose
/// -------
/// Fit the h2h design from a perturbed start and return the fitted model.
///
/// Returns
/// -------
/// - `(model, data)` with `model.results` populated.
fn fit_h2h_model() -> (CalibrationModel, CalibrationData) {
    let data = make_h2h_data(0.03);
    let mut model = CalibrationModel::for_data(&data, fit_options());
    let theta0 = array![0.9, 1.5, 0.1, -0.2, 0.6, 1.8, -3.0, -3.0];
    model.fit(theta0, &data).expect("fit should succeed on a well-posed h2h design");
    (model, data)
}

#[test]
// Purpose
// -------
// The fitted slopes, intercepts, and h2h CenTauR values recover the values
// used to generate the data.
//
// Given
// -----
// - Two tracers, six reference subjects, two h2h subjects, small
//   deterministic noise.
//
// Expect
// ------
// - Fit results present with a finite log-likelihood.
// - Slopes, intercepts, and h2h values within 0.05 of the truth.
// - Residual scales positive and of the order of the noise.
fn fit_recovers_h2h_calibration() {
    // Arrange / Act
    let (model, data) = fit_h2h_model();

    // Assert
    let outcome = model.results.as_ref().expect("results populated after fit");
    assert!(outcome.value.is_finite());
    let params = model.fitted_params.as_ref().expect("fitted params populated after fit");
    for t in 0..2 {
        assert!((params.slope_tracer[t] - TRUE_SLOPES[t]).abs() < 0.05);
        assert!((params.intercept_tracer[t] - TRUE_INTERCEPTS[t]).abs() < 0.05);
    }
    for s in 0..2 {
        assert!((params.centaur_h2h_subj[s] - TRUE_H2H[s]).abs() < 0.05);
    }
    let scales = model.scale_estimates(&data).expect("scale estimates after fit");
    for &sigma in scales.residual.iter() {
        assert!(sigma > 0.0 && sigma < 0.1);
    }
}

#[test]
// Purpose
// -------
// Inference at θ̂ yields usable standard errors.
//
// Given
// -----
// - The fitted h2h model.
//
// Expect
// ------
// - One finite, strictly positive SE per parameter.
// - Finite, non-negative delta-method SEs for the residual scales.
fn standard_errors_are_finite_at_fit() {
    // Arrange
    let (model, data) = fit_h2h_model();

    // Act
    let se = model.standard_errors(&data).expect("standard errors after fit");
    let scales = model.scale_estimates(&data).expect("scale estimates after fit");

    // Assert
    assert_eq!(se.len(), model.shape.theta_len());
    assert!(se.iter().all(|s| s.is_finite() && *s > 0.0));
    assert!(scales.residual_se.iter().all(|s| s.is_finite() && *s >= 0.0));
}

#[test]
// Purpose
// -------
// The NLL at θ̂ is the sum of its terms and matches the stored optimum.
//
// Given
// -----
// - The fitted h2h model.
//
// Expect
// ------
// - `breakdown.total()` equals `nll(θ̂)` and `-outcome.value` within 1e-9.
// - No degenerate observations.
fn fitted_breakdown_matches_optimum() {
    // Arrange
    let (model, data) = fit_h2h_model();
    let params = model.fitted_params.as_ref().expect("fitted params populated after fit");

    // Act
    let breakdown = fitted_breakdown(&model, &data).expect("breakdown after fit");
    let nll = model.nll(params, &data).expect("shapes agree");

    // Assert
    assert_eq!(breakdown.observations.len(), data.suvr.len());
    assert!(breakdown.prior.is_empty());
    assert!((breakdown.total() - nll).abs() < 1e-9);
    let outcome = model.results.as_ref().expect("results populated after fit");
    assert!((nll + outcome.value).abs() < 1e-9);
    assert_eq!(breakdown.degenerate_observations().count(), 0);
}

#[test]
// Purpose
// -------
// With anchors, h2h subjects, and two variance components, the analytic
// gradient agrees with central differences of the NLL.
//
// Given
// -----
// - `make_anchor_data()` at `anchor_theta()`.
//
// Expect
// ------
// - Every gradient entry within 1e-5 of the finite-difference value.
// - `LogLikelihood::grad` is the negated NLL gradient.
fn anchor_gradient_matches_finite_differences() {
    // Arrange
    let data = make_anchor_data();
    let model = CalibrationModel::for_data(&data, CalibrationOptions::default());
    let theta = anchor_theta();
    let nll_at = |t: &Array1<f64>| {
        let params = CalibrationParams::from_theta(t.view(), &model.shape).expect("valid theta");
        model.nll(&params, &data).expect("shapes agree")
    };

    // Act
    let params = CalibrationParams::from_theta(theta.view(), &model.shape).expect("valid theta");
    let analytic = model.nll_grad(&params, &data).expect("shapes agree").to_theta();
    let numeric = central_fd_gradient(&theta, &nll_at).expect("finite differences");
    let loglik_grad = model.grad(&theta, &data).expect("shapes agree");

    // Assert
    assert_eq!(analytic.len(), 11);
    for (a, n) in analytic.iter().zip(numeric.iter()) {
        assert!((a - n).abs() < 1e-5, "analytic {a} vs numeric {n}");
    }
    for (a, l) in analytic.iter().zip(loglik_grad.iter()) {
        assert_eq!(*l, -*a);
    }
}

#[test]
// Purpose
// -------
// Evaluation is pure: repeated calls give bitwise-identical results.
//
// Given
// -----
// - `make_anchor_data()` at `anchor_theta()`.
//
// Expect
// ------
// - Equal NLL bits and equal gradients across two calls.
fn evaluation_is_deterministic() {
    // Arrange
    let data = make_anchor_data();
    let model = CalibrationModel::for_data(&data, CalibrationOptions::default());
    let params =
        CalibrationParams::from_theta(anchor_theta().view(), &model.shape).expect("valid theta");

    // Act
    let first = model.nll(&params, &data).expect("shapes agree");
    let second = model.nll(&params, &data).expect("shapes agree");
    let g1 = model.nll_grad(&params, &data).expect("shapes agree");
    let g2 = model.nll_grad(&params, &data).expect("shapes agree");

    // Assert
    assert!(first.is_finite());
    assert_eq!(first.to_bits(), second.to_bits());
    assert_eq!(g1, g2);
}

#[test]
// Purpose
// -------
// With every parameter at zero except unit slopes, the fit reduces to the
// baseline CenTauR and the scale to the row sum of `V`.
//
// Given
// -----
// - One tracer, slope 1, intercept 0, no h2h or anchors.
// - Row `V = [1, 1]`, both log σ = 0.
//
// Expect
// ------
// - NLL equals `-log N(y; c, 2)` computed by hand.
fn zero_parameters_reduce_to_baseline() {
    // Arrange
    let (y, c) = (1.3_f64, 1.0_f64);
    let data = CalibrationData::new(
        array![y],
        array![[1.0]],
        array![c],
        Array2::zeros((1, 0)),
        Array2::zeros((1, 0)),
        array![[1.0, 1.0]],
        Array2::zeros((0, 0)),
    )
    .expect("valid data");
    let model = CalibrationModel::for_data(&data, CalibrationOptions::default());
    let theta = array![1.0, 0.0, 0.0, 0.0];
    let params = CalibrationParams::from_theta(theta.view(), &model.shape).expect("valid theta");

    // Act
    let nll = model.nll(&params, &data).expect("shapes agree");

    // Assert
    let sd = 2.0_f64;
    let expected = 0.5 * (2.0 * std::f64::consts::PI).ln() + sd.ln() + 0.5 * ((y - c) / sd).powi(2);
    assert!((nll - expected).abs() < 1e-12);
}

#[test]
// Purpose
// -------
// A model built for one dataset scores another with the same design
// columns but a different number of rows.
//
// Given
// -----
// - Model built from the h2h design with 16 rows.
// - A second h2h design truncated to its first 10 rows.
//
// Expect
// ------
// - Finite NLL on both datasets.
fn model_scores_datasets_with_matching_columns() {
    // Arrange
    let full = make_h2h_data(0.03);
    let model = CalibrationModel::for_data(&full, CalibrationOptions::default());
    let keep = 10;
    let sub = CalibrationData::new(
        full.suvr.slice(s![..keep]).to_owned(),
        full.x_tracer.slice(s![..keep, ..]).to_owned(),
        full.x_centaur.slice(s![..keep]).to_owned(),
        full.x_h2h_subj.slice(s![..keep, ..]).to_owned(),
        Array2::zeros((keep, 0)),
        full.v.slice(s![..keep, ..]).to_owned(),
        Array2::zeros((0, 0)),
    )
    .expect("valid truncated data");
    let theta = array![1.0, 1.6, 0.0, -0.3, 0.8, 2.1, -2.0, -2.0];
    let params = CalibrationParams::from_theta(theta.view(), &model.shape).expect("valid theta");

    // Act
    let nll_full = model.nll(&params, &full).expect("shapes agree");
    let nll_sub = model.nll(&params, &sub).expect("shapes agree");

    // Assert
    assert!(nll_full.is_finite());
    assert!(nll_sub.is_finite());
    assert_ne!(nll_full, nll_sub);
}

#[test]
// Purpose
// -------
// A zero slope makes the unguarded NLL non-finite without an error, while
// the floored mode stays finite; fitting from such a start is rejected.
//
// Given
// -----
// - The h2h design with tracer 0 slope set to 0.
//
// Expect
// ------
// - Unguarded: `Ok` with a non-finite value; `fit` returns
//   `OptError::NonFiniteCost` and caches nothing.
// - Floored at 1e-3: `Ok` with a finite value.
fn zero_slope_is_unguarded_by_default() {
    // Arrange
    let data = make_h2h_data(0.03);
    let theta = array![0.0, 1.6, 0.0, -0.3, 0.8, 2.1, -2.0, -2.0];
    let mut unguarded = CalibrationModel::for_data(&data, fit_options());
    let floored = CalibrationModel::for_data(
        &data,
        CalibrationOptions::new(
            MLEOptions::default(),
            ScaleMode::floored(1e-3).expect("positive floor"),
        ),
    );
    let params =
        CalibrationParams::from_theta(theta.view(), &unguarded.shape).expect("valid theta");

    // Act
    let raw = unguarded.nll(&params, &data).expect("shapes agree");
    let guarded = floored.nll(&params, &data).expect("shapes agree");
    let fit = unguarded.fit(theta.clone(), &data);

    // Assert
    assert!(!raw.is_finite());
    assert!(guarded.is_finite());
    assert!(matches!(fit, Err(OptError::NonFiniteCost { .. })));
    assert!(unguarded.results.is_none());
}
