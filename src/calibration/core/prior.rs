//! Random-effect prior accumulator.
//!
//! Each anchor subject `j` carries a random CenTauR offset `θ_j` with a
//! zero-mean normal prior. Its standard deviation is the dot product of the
//! subject's variance design row with the subject scale components:
//!
//! `sd_j = Σ_k v_subj[j, k] · exp(log_sigma_subj_group[k])`
//!
//! and the subject contributes `-ln N(θ_j; 0, sd_j)` to the NLL. The scale is
//! passed through [`ScaleMode::apply`] and is otherwise unvalidated.
//!
//! The density is evaluated through `sd_j²`, so a negative `sd_j` scores
//! exactly like `|sd_j|` instead of producing NaN. Under
//! [`ScaleMode::Unguarded`] a zero `sd_j` gives a non-finite term.
use crate::calibration::core::{
    data::CalibrationData,
    density::{neg_log_normal, neg_log_normal_term},
    params::CalibrationParams,
    variance::{ScaleMode, VarianceScales},
};
use ndarray::Zip;

/// Prior contribution of one anchor subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorTerm {
    pub subject: usize,
    /// Random CenTauR offset `θ_j`.
    pub offset: f64,
    /// Effective prior standard deviation.
    pub sd: f64,
    pub nll: f64,
}

/// Raw (pre-[`ScaleMode`]) prior standard deviation of subject `j`.
#[inline]
pub fn subject_sd(j: usize, scales: &VarianceScales, data: &CalibrationData) -> f64 {
    data.v_subj.row(j).dot(&scales.subject)
}

pub fn prior_term(
    j: usize, params: &CalibrationParams, scales: &VarianceScales, data: &CalibrationData,
    mode: ScaleMode,
) -> PriorTerm {
    let (sd, _) = mode.apply(subject_sd(j, scales, data));
    let offset = params.centaur_subj[j];
    PriorTerm { subject: j, offset, sd, nll: neg_log_normal(offset, 0.0, sd) }
}

/// Sum of all anchor-subject prior terms. Zero when there are no anchors.
pub fn prior_nll(
    params: &CalibrationParams, scales: &VarianceScales, data: &CalibrationData, mode: ScaleMode,
) -> f64 {
    (0..params.centaur_subj.len()).map(|j| prior_term(j, params, scales, data, mode).nll).sum()
}

/// Add ∂(prior NLL)/∂θ into `grad`.
///
/// Touches `centaur_subj` through the density's `∂/∂x` and
/// `log_sigma_subj_group` through `∂/∂sd · v_subj[j, k] · σ_k`, the last
/// factor being the derivative of the exponential link.
pub fn accumulate_prior_grad(
    params: &CalibrationParams, scales: &VarianceScales, data: &CalibrationData, mode: ScaleMode,
    grad: &mut CalibrationParams,
) {
    for j in 0..params.centaur_subj.len() {
        let (sd, d_eff) = mode.apply(subject_sd(j, scales, data));
        let term = neg_log_normal_term(params.centaur_subj[j], 0.0, sd);
        grad.centaur_subj[j] += term.d_x;

        let coef = term.d_sd * d_eff;
        Zip::from(&mut grad.log_sigma_subj_group)
            .and(data.v_subj.row(j))
            .and(&scales.subject)
            .for_each(|g, &v, &s| *g += coef * v * s);
    }
}
