//! Observation likelihood accumulator.
//!
//! Purpose
//! -------
//! Reconstruct, for every observation, the tracer calibration line, the
//! CenTauR value it is evaluated at, and the slope-scaled residual scale,
//! then score the observed SUVR under the implied normal.
//!
//! Key behaviors
//! -------------
//! For observation `i`:
//! 1. `slope = X[i]·slope_tracer`, `intercept = X[i]·intercept_tracer`.
//! 2. `centaur = x_centaur[i] + H[i]·centaur_h2h_subj`.
//! 3. `random = Z[i]·centaur_subj` (zero when the row has no anchor).
//! 4. `yfit = slope · (centaur + random) + intercept`. The random effect
//!    lives on the CenTauR scale, before the affine tracer map.
//! 5. `sd = slope · (V[i]·σ)` with `σ = exp(log_sigma_tracer)`.
//! 6. NLL term `-ln N(suvr[i]; yfit, sd)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A negative slope makes `sd` negative. The density squares its scale,
//!   so the term equals the one for `|sd|`.
//! - `sd = 0` produces a non-finite term under [`ScaleMode::Unguarded`].
//!
//! Conventions
//! -----------
//! - [`ObservationFit::sd`] is the effective scale after [`ScaleMode`].
//! - Gradients are accumulated into a [`CalibrationParams`] of zeros, in
//!   NLL orientation (not log-likelihood).
use crate::calibration::core::{
    data::CalibrationData,
    density::{neg_log_normal, neg_log_normal_term},
    params::CalibrationParams,
    variance::{ScaleMode, VarianceScales},
};
use ndarray::Zip;

/// Per-observation quantities of the calibration model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationFit {
    pub index: usize,
    pub suvr: f64,
    pub slope: f64,
    pub intercept: f64,
    /// Baseline plus head-to-head correction.
    pub centaur: f64,
    /// Random-effect contribution on the CenTauR scale.
    pub random: f64,
    pub yfit: f64,
    /// `V[i]·σ`, the residual scale before slope scaling.
    pub scale_sum: f64,
    pub sd: f64,
    pub nll: f64,
}

impl ObservationFit {
    pub fn residual(&self) -> f64 {
        self.suvr - self.yfit
    }
}

pub fn fit_observation(
    i: usize, params: &CalibrationParams, scales: &VarianceScales, data: &CalibrationData,
    mode: ScaleMode,
) -> ObservationFit {
    let x_row = data.x_tracer.row(i);
    let slope = x_row.dot(&params.slope_tracer);
    let intercept = x_row.dot(&params.intercept_tracer);
    let centaur = data.x_centaur[i] + data.x_h2h_subj.row(i).dot(&params.centaur_h2h_subj);
    let random = data.z_subj.row(i).dot(&params.centaur_subj);
    let yfit = slope * (centaur + random) + intercept;
    let scale_sum = data.v.row(i).dot(&scales.residual);
    let (sd, _) = mode.apply(slope * scale_sum);
    let suvr = data.suvr[i];

    ObservationFit {
        index: i,
        suvr,
        slope,
        intercept,
        centaur,
        random,
        yfit,
        scale_sum,
        sd,
        nll: neg_log_normal(suvr, yfit, sd),
    }
}

pub fn observation_nll(
    params: &CalibrationParams, scales: &VarianceScales, data: &CalibrationData, mode: ScaleMode,
) -> f64 {
    (0..data.suvr.len()).map(|i| fit_observation(i, params, scales, data, mode).nll).sum()
}

/// Add ∂(observation NLL)/∂θ into `grad`.
///
/// With `m = ∂/∂yfit` and `s = ∂/∂sd` of the normal term (after the scale
/// mode's derivative):
/// - `slope_tracer += X[i] · (m·(centaur + random) + s·(V[i]·σ))`
/// - `intercept_tracer += X[i] · m`
/// - `centaur_h2h_subj += H[i] · m·slope`
/// - `centaur_subj += Z[i] · m·slope`
/// - `log_sigma_tracer[k] += s·slope·V[i, k]·σ_k`
pub fn accumulate_observation_grad(
    params: &CalibrationParams, scales: &VarianceScales, data: &CalibrationData, mode: ScaleMode,
    grad: &mut CalibrationParams,
) {
    for i in 0..data.suvr.len() {
        let fit = fit_observation(i, params, scales, data, mode);
        let term = neg_log_normal_term(fit.suvr, fit.yfit, fit.sd);
        let (_, d_eff) = mode.apply(fit.slope * fit.scale_sum);
        let d_mean = term.d_mean;
        let d_sd = term.d_sd * d_eff;

        let x_row = data.x_tracer.row(i);
        grad.slope_tracer
            .scaled_add(d_mean * (fit.centaur + fit.random) + d_sd * fit.scale_sum, &x_row);
        grad.intercept_tracer.scaled_add(d_mean, &x_row);
        grad.centaur_h2h_subj.scaled_add(d_mean * fit.slope, &data.x_h2h_subj.row(i));
        grad.centaur_subj.scaled_add(d_mean * fit.slope, &data.z_subj.row(i));

        let coef = d_sd * fit.slope;
        Zip::from(&mut grad.log_sigma_tracer)
            .and(data.v.row(i))
            .and(&scales.residual)
            .for_each(|g, &v, &s| *g += coef * v * s);
    }
}
