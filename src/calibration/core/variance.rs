//! Variance transform and scale handling.
//!
//! Both log-variance blocks are mapped to scale components with the
//! exponential link, once per evaluation. A standard deviation is then a
//! linear combination of those components through a variance design row;
//! for observations it is additionally multiplied by the tracer slope.
//!
//! Nothing guarantees that combination is positive. [`ScaleMode`] decides
//! what happens when it is not:
//! - `Unguarded` (default): the value goes into the density as-is. Zero
//!   gives a non-finite NLL; a negative value is handled by the density's
//!   squared-scale form.
//! - `Floored { floor }`: a separate, opt-in mode that replaces any scale
//!   with `|sd| < floor` by `floor`.
use crate::{
    calibration::{
        core::params::CalibrationParams,
        errors::{CalibrationError, CalibrationResult},
    },
    optimization::numerical_stability::transformations::exp_link,
};
use ndarray::Array1;

/// Scale components for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceScales {
    /// `exp(log_sigma_tracer)`, length `n_var`.
    pub residual: Array1<f64>,
    /// `exp(log_sigma_subj_group)`, length `n_anchor_var`.
    pub subject: Array1<f64>,
}

impl VarianceScales {
    pub fn from_params(params: &CalibrationParams) -> Self {
        VarianceScales {
            residual: exp_link(params.log_sigma_tracer.view()),
            subject: exp_link(params.log_sigma_subj_group.view()),
        }
    }
}

/// Policy for standard deviations that are zero or near zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScaleMode {
    #[default]
    Unguarded,
    Floored { floor: f64 },
}

impl ScaleMode {
    /// Validated `Floored` mode.
    ///
    /// # Errors
    /// [`CalibrationError::InvalidScaleFloor`] unless `floor` is finite and
    /// strictly positive.
    pub fn floored(floor: f64) -> CalibrationResult<Self> {
        if !floor.is_finite() || floor <= 0.0 {
            return Err(CalibrationError::InvalidScaleFloor { value: floor });
        }
        Ok(ScaleMode::Floored { floor })
    }

    /// Effective scale and its derivative with respect to the raw scale.
    ///
    /// A floored value is constant, so its derivative is zero.
    #[inline]
    pub fn apply(self, sd: f64) -> (f64, f64) {
        match self {
            ScaleMode::Unguarded => (sd, 1.0),
            ScaleMode::Floored { floor } if sd.abs() < floor => (floor, 0.0),
            ScaleMode::Floored { .. } => (sd, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the exponential link on parameter blocks and both
    // scale modes.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Log-variance blocks map to their exponentials.
    //
    // Given
    // -----
    // - `log_sigma_tracer = [0, ln 3]`, `log_sigma_subj_group = [ln 0.5]`.
    //
    // Expect
    // ------
    // - residual `[1, 3]`, subject `[0.5]`.
    fn scales_exponentiate_log_blocks() {
        // Arrange
        let params = CalibrationParams {
            slope_tracer: array![1.0],
            intercept_tracer: array![0.0],
            centaur_h2h_subj: Array1::zeros(0),
            centaur_subj: array![0.0],
            log_sigma_tracer: array![0.0, 3.0_f64.ln()],
            log_sigma_subj_group: array![0.5_f64.ln()],
        };

        // Act
        let scales = VarianceScales::from_params(&params);

        // Assert
        assert_eq!(scales.residual[0], 1.0);
        assert!((scales.residual[1] - 3.0).abs() < 1e-14);
        assert!((scales.subject[0] - 0.5).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // `Unguarded` passes every value through, including zero and negatives.
    //
    // Given
    // -----
    // - Raw scales `0`, `-2`, `1e-300`.
    //
    // Expect
    // ------
    // - Identity with derivative 1.
    fn unguarded_is_identity() {
        for sd in [0.0, -2.0, 1e-300] {
            assert_eq!(ScaleMode::Unguarded.apply(sd), (sd, 1.0));
        }
    }

    #[test]
    // Purpose
    // -------
    // `Floored` replaces small magnitudes only, and rejects a bad floor.
    //
    // Given
    // -----
    // - `floor = 1e-3`; raw scales `0`, `-5e-4`, `-2`, `0.5`.
    // - Floors `0`, `-1`, `NaN`.
    //
    // Expect
    // ------
    // - `(1e-3, 0)` for the first two, identity otherwise.
    // - `InvalidScaleFloor` for each bad floor.
    fn floored_replaces_small_scales() {
        // Arrange
        let mode = ScaleMode::floored(1e-3).expect("valid floor");

        // Assert
        assert_eq!(mode.apply(0.0), (1e-3, 0.0));
        assert_eq!(mode.apply(-5e-4), (1e-3, 0.0));
        assert_eq!(mode.apply(-2.0), (-2.0, 1.0));
        assert_eq!(mode.apply(0.5), (0.5, 1.0));
        for bad in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                ScaleMode::floored(bad),
                Err(CalibrationError::InvalidScaleFloor { .. })
            ));
        }
    }
}
