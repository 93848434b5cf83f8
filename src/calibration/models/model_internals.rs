//! Calibration model internals — term-level traversal and NLL breakdown.
//!
//! Purpose
//! -------
//! Expose the individual terms that make up the calibration NLL: one prior
//! term per anchor subject and one likelihood term per observation, each
//! with the intermediate quantities that produced it. Used for diagnostics
//! (which observations dominate the fit, where a scale went non-positive)
//! and for checking that the NLL is exactly the sum of its terms.
//!
//! Key behaviors
//! -------------
//! - [`walk_observations`] feeds each [`ObservationFit`] into a closure
//!   without collecting them.
//! - [`observation_fits`] collects the same traversal into a `Vec`.
//! - [`nll_breakdown`] returns every prior and observation term.
//! - [`fitted_breakdown`] does the same at θ̂ of a fitted model.
//!
//! Invariants & assumptions
//! ------------------------
//! - Terms are computed by the same accumulator functions that
//!   [`CalibrationModel::nll`] sums, in the same order, so
//!   [`NllBreakdown::total`] reproduces it up to summation order.
//! - Shape checks are those of [`CalibrationModel::nll`].
//!
//! Conventions
//! -----------
//! - Observation indices are 0-based rows of the data; prior indices are
//!   0-based anchor subjects (columns of `z_subj`).
//!
//! Testing notes
//! -------------
//! - Unit tests cover additivity against `nll`, per-observation values on a
//!   hand-computed case, and the not-fitted error path.
use crate::calibration::{
    core::{
        data::CalibrationData,
        observation::{ObservationFit, fit_observation},
        params::CalibrationParams,
        prior::{PriorTerm, prior_term},
        variance::VarianceScales,
    },
    errors::{CalibrationError, CalibrationResult},
    models::calibration::CalibrationModel,
};

/// Every term of the calibration NLL at one parameter point.
#[derive(Debug, Clone, PartialEq)]
pub struct NllBreakdown {
    pub prior: Vec<PriorTerm>,
    pub observations: Vec<ObservationFit>,
}

impl NllBreakdown {
    pub fn prior_total(&self) -> f64 {
        self.prior.iter().map(|t| t.nll).sum()
    }

    pub fn observation_total(&self) -> f64 {
        self.observations.iter().map(|o| o.nll).sum()
    }

    pub fn total(&self) -> f64 {
        self.prior_total() + self.observation_total()
    }

    /// Observations whose effective scale is zero or non-finite.
    pub fn degenerate_observations(&self) -> impl Iterator<Item = &ObservationFit> + '_ {
        self.observations.iter().filter(|o| o.sd == 0.0 || !o.sd.is_finite())
    }
}

/// Run `step` on every observation at `params`, in row order.
///
/// # Errors
/// Shape mismatches between `model`, `params` and `data`.
pub fn walk_observations<F>(
    model: &CalibrationModel, params: &CalibrationParams, data: &CalibrationData, mut step: F,
) -> CalibrationResult<()>
where
    F: FnMut(&ObservationFit),
{
    model.check_inputs(params, data)?;
    let scales = VarianceScales::from_params(params);
    let mode = model.options.scale_mode;
    for i in 0..data.suvr.len() {
        step(&fit_observation(i, params, &scales, data, mode));
    }
    Ok(())
}

/// Per-observation slope, intercept, CenTauR value, random effect, fit and
/// scale at `params`.
///
/// # Errors
/// Shape mismatches between `model`, `params` and `data`.
pub fn observation_fits(
    model: &CalibrationModel, params: &CalibrationParams, data: &CalibrationData,
) -> CalibrationResult<Vec<ObservationFit>> {
    let mut fits = Vec::with_capacity(data.suvr.len());
    walk_observations(model, params, data, |fit| fits.push(*fit))?;
    Ok(fits)
}

/// # Errors
/// Shape mismatches between `model`, `params` and `data`.
pub fn nll_breakdown(
    model: &CalibrationModel, params: &CalibrationParams, data: &CalibrationData,
) -> CalibrationResult<NllBreakdown> {
    let observations = observation_fits(model, params, data)?;
    let scales = VarianceScales::from_params(params);
    let mode = model.options.scale_mode;
    let prior = (0..params.centaur_subj.len())
        .map(|j| prior_term(j, params, &scales, data, mode))
        .collect();
    Ok(NllBreakdown { prior, observations })
}

/// [`nll_breakdown`] at the fitted parameters.
///
/// # Errors
/// - [`CalibrationError::ModelNotFitted`] before `fit`.
/// - Shape mismatches between `model` and `data`.
pub fn fitted_breakdown(
    model: &CalibrationModel, data: &CalibrationData,
) -> CalibrationResult<NllBreakdown> {
    let params = model.fitted_params.as_ref().ok_or(CalibrationError::ModelNotFitted)?;
    nll_breakdown(model, params, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::core::options::CalibrationOptions;
    use ndarray::{Array1, Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover additivity of the breakdown, per-observation values,
    // degenerate-scale reporting, and the not-fitted path.
    // -------------------------------------------------------------------------

    fn two_anchor_data() -> CalibrationData {
        CalibrationData::new(
            array![1.2, 0.7, 1.9, 1.1],
            array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]],
            array![0.5, 0.5, 1.2, 1.2],
            array![[0.0], [0.0], [1.0], [1.0]],
            array![[1.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]],
            array![[1.0], [1.0], [1.0], [1.0]],
            array![[1.0, 0.0], [0.0, 1.0]],
        )
        .expect("valid data")
    }

    fn two_anchor_params(model: &CalibrationModel) -> CalibrationParams {
        // slopes, intercepts, h2h, offsets, log σ, log σ_subj
        let theta = array![1.0, 0.8, 0.1, 0.2, 0.3, 0.25, -0.15, -1.0, -0.5, -0.9];
        CalibrationParams::from_theta(theta.view(), &model.shape).expect("valid theta")
    }

    #[test]
    // Purpose
    // -------
    // Prior terms plus observation terms equal the NLL.
    //
    // Given
    // -----
    // - Two anchors with separate subject-variance components, two tracers,
    //   one h2h column, four observations.
    //
    // Expect
    // ------
    // - Two prior terms, four observation terms; totals match `nll` within
    //   1e-12.
    fn breakdown_sums_to_nll() {
        // Arrange
        let data = two_anchor_data();
        let model = CalibrationModel::for_data(&data, CalibrationOptions::default());
        let params = two_anchor_params(&model);

        // Act
        let breakdown = nll_breakdown(&model, &params, &data).expect("shapes agree");
        let nll = model.nll(&params, &data).expect("shapes agree");

        // Assert
        assert_eq!(breakdown.prior.len(), 2);
        assert_eq!(breakdown.observations.len(), 4);
        assert!((breakdown.total() - nll).abs() < 1e-12);
        assert_eq!(breakdown.degenerate_observations().count(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Observation fits expose the reconstructed quantities per row.
    //
    // Given
    // -----
    // - Row 2 of `two_anchor_data()`: tracer 0 (slope 1, intercept 0.1),
    //   baseline 1.2 plus h2h 0.3, anchor 1 offset -0.15.
    //
    // Expect
    // ------
    // - `centaur = 1.5`, `random = -0.15`, `yfit = 1.45`,
    //   `sd = exp(-1)`.
    fn observation_fits_expose_row_quantities() {
        // Arrange
        let data = two_anchor_data();
        let model = CalibrationModel::for_data(&data, CalibrationOptions::default());
        let params = two_anchor_params(&model);

        // Act
        let fits = observation_fits(&model, &params, &data).expect("shapes agree");

        // Assert
        let row = fits[2];
        assert_eq!(row.index, 2);
        assert_eq!(row.slope, 1.0);
        assert!((row.centaur - 1.5).abs() < 1e-15);
        assert_eq!(row.random, -0.15);
        assert!((row.yfit - 1.45).abs() < 1e-14);
        assert!((row.sd - (-1.0_f64).exp()).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // A zero slope shows up as a degenerate observation instead of an error.
    //
    // Given
    // -----
    // - Single observation with slope 0.
    //
    // Expect
    // ------
    // - One degenerate observation; non-finite total.
    fn zero_slope_is_reported_as_degenerate() {
        // Arrange
        let data = CalibrationData::new(
            array![1.0],
            array![[1.0]],
            array![1.0],
            Array2::zeros((1, 0)),
            Array2::zeros((1, 0)),
            array![[1.0]],
            Array2::zeros((0, 0)),
        )
        .expect("valid data");
        let model = CalibrationModel::for_data(&data, CalibrationOptions::default());
        let params = CalibrationParams::new(
            &model.shape,
            array![0.0],
            array![1.0],
            Array1::zeros(0),
            Array1::zeros(0),
            array![0.0],
            Array1::zeros(0),
        )
        .expect("valid blocks");

        // Act
        let breakdown = nll_breakdown(&model, &params, &data).expect("shapes agree");

        // Assert
        assert_eq!(breakdown.degenerate_observations().count(), 1);
        assert!(!breakdown.total().is_finite());
    }

    #[test]
    // Purpose
    // -------
    // A negative effective scale is a valid scale, not a degenerate one.
    //
    // Given
    // -----
    // - Single observation with slope -1, so the effective sd is -1.
    //
    // Expect
    // ------
    // - No degenerate observations; finite total.
    fn negative_slope_is_not_degenerate() {
        // Arrange
        let data = CalibrationData::new(
            array![1.0],
            array![[1.0]],
            array![1.0],
            Array2::zeros((1, 0)),
            Array2::zeros((1, 0)),
            array![[1.0]],
            Array2::zeros((0, 0)),
        )
        .expect("valid data");
        let model = CalibrationModel::for_data(&data, CalibrationOptions::default());
        let params = CalibrationParams::new(
            &model.shape,
            array![-1.0],
            array![1.0],
            Array1::zeros(0),
            Array1::zeros(0),
            array![0.0],
            Array1::zeros(0),
        )
        .expect("valid blocks");

        // Act
        let breakdown = nll_breakdown(&model, &params, &data).expect("shapes agree");

        // Assert
        assert_eq!(breakdown.observations[0].sd, -1.0);
        assert_eq!(breakdown.degenerate_observations().count(), 0);
        assert!(breakdown.total().is_finite());
    }

    #[test]
    // Purpose
    // -------
    // The fitted breakdown needs a fitted model.
    //
    // Given
    // -----
    // - A fresh model.
    //
    // Expect
    // ------
    // - `ModelNotFitted`.
    fn fitted_breakdown_requires_fit() {
        // Arrange
        let data = two_anchor_data();
        let model = CalibrationModel::for_data(&data, CalibrationOptions::default());

        // Act
        let res = fitted_breakdown(&model, &data);

        // Assert
        assert_eq!(res, Err(CalibrationError::ModelNotFitted));
    }
}
