//! Structured calibration parameters.
//!
//! [`CalibrationParams`] replaces positional slicing of θ with six named,
//! length-checked blocks. Conversion to and from the optimizer's flat
//! vector goes through [`CalibrationShape::block_range`], so the layout is
//! defined in exactly one place.
//!
//! The same type doubles as the gradient container: `nll_grad` fills a
//! [`CalibrationParams::zeros`] block set and flattens it with
//! [`CalibrationParams::to_theta`].
use crate::calibration::{
    core::{
        shape::{CalibrationShape, ParamBlock},
        validation::validate_theta,
    },
    errors::{CalibrationError, CalibrationResult},
};
use ndarray::{Array1, ArrayView1, ArrayViewMut1, s};

/// The six parameter blocks of the calibration model.
///
/// - `slope_tracer`, `intercept_tracer`: per-tracer affine map from the
///   CenTauR scale to SUVR.
/// - `centaur_h2h_subj`: head-to-head fixed-effect corrections to baseline
///   CenTauR values.
/// - `centaur_subj`: random CenTauR offsets of anchor subjects.
/// - `log_sigma_tracer`: log residual-variance components.
/// - `log_sigma_subj_group`: log subject-variance components.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationParams {
    pub slope_tracer: Array1<f64>,
    pub intercept_tracer: Array1<f64>,
    pub centaur_h2h_subj: Array1<f64>,
    pub centaur_subj: Array1<f64>,
    pub log_sigma_tracer: Array1<f64>,
    pub log_sigma_subj_group: Array1<f64>,
}

impl CalibrationParams {
    /// Build from named blocks, checking each against `shape`.
    ///
    /// # Errors
    /// [`CalibrationError::BlockLengthMismatch`] for the first block, in θ
    /// order, whose length disagrees with `shape`.
    pub fn new(
        shape: &CalibrationShape, slope_tracer: Array1<f64>, intercept_tracer: Array1<f64>,
        centaur_h2h_subj: Array1<f64>, centaur_subj: Array1<f64>, log_sigma_tracer: Array1<f64>,
        log_sigma_subj_group: Array1<f64>,
    ) -> CalibrationResult<Self> {
        let params = CalibrationParams {
            slope_tracer,
            intercept_tracer,
            centaur_h2h_subj,
            centaur_subj,
            log_sigma_tracer,
            log_sigma_subj_group,
        };
        params.check_shape(shape)?;
        Ok(params)
    }

    /// All-zero blocks sized for `shape`.
    pub fn zeros(shape: &CalibrationShape) -> Self {
        CalibrationParams {
            slope_tracer: Array1::zeros(shape.n_tracer),
            intercept_tracer: Array1::zeros(shape.n_tracer),
            centaur_h2h_subj: Array1::zeros(shape.n_h2h),
            centaur_subj: Array1::zeros(shape.n_anchor),
            log_sigma_tracer: Array1::zeros(shape.n_var),
            log_sigma_subj_group: Array1::zeros(shape.n_anchor_var),
        }
    }

    /// Split a flat θ into named blocks.
    ///
    /// # Errors
    /// - [`CalibrationError::ThetaLengthMismatch`] if
    ///   `theta.len() != shape.theta_len()`.
    /// - [`CalibrationError::NonFiniteTheta`] for the first NaN/±inf entry.
    pub fn from_theta(theta: ArrayView1<f64>, shape: &CalibrationShape) -> CalibrationResult<Self> {
        validate_theta(theta, shape)?;
        let mut params = CalibrationParams::zeros(shape);
        for block in ParamBlock::ALL {
            params.block_mut(block).assign(&theta.slice(s![shape.block_range(block)]));
        }
        Ok(params)
    }

    /// Concatenate the blocks in θ order.
    pub fn to_theta(&self) -> Array1<f64> {
        let len: usize = ParamBlock::ALL.iter().map(|&b| self.block(b).len()).sum();
        let mut theta = Array1::zeros(len);
        let mut start = 0;
        for block in ParamBlock::ALL {
            let values = self.block(block);
            theta.slice_mut(s![start..start + values.len()]).assign(&values);
            start += values.len();
        }
        theta
    }

    pub fn block(&self, block: ParamBlock) -> ArrayView1<'_, f64> {
        match block {
            ParamBlock::SlopeTracer => self.slope_tracer.view(),
            ParamBlock::InterceptTracer => self.intercept_tracer.view(),
            ParamBlock::CentaurH2hSubj => self.centaur_h2h_subj.view(),
            ParamBlock::CentaurSubj => self.centaur_subj.view(),
            ParamBlock::LogSigmaTracer => self.log_sigma_tracer.view(),
            ParamBlock::LogSigmaSubjGroup => self.log_sigma_subj_group.view(),
        }
    }

    pub fn block_mut(&mut self, block: ParamBlock) -> ArrayViewMut1<'_, f64> {
        match block {
            ParamBlock::SlopeTracer => self.slope_tracer.view_mut(),
            ParamBlock::InterceptTracer => self.intercept_tracer.view_mut(),
            ParamBlock::CentaurH2hSubj => self.centaur_h2h_subj.view_mut(),
            ParamBlock::CentaurSubj => self.centaur_subj.view_mut(),
            ParamBlock::LogSigmaTracer => self.log_sigma_tracer.view_mut(),
            ParamBlock::LogSigmaSubjGroup => self.log_sigma_subj_group.view_mut(),
        }
    }

    /// Verify every block length against `shape`.
    ///
    /// # Errors
    /// [`CalibrationError::BlockLengthMismatch`] for the first mismatch.
    pub fn check_shape(&self, shape: &CalibrationShape) -> CalibrationResult<()> {
        for block in ParamBlock::ALL {
            let expected = shape.block_len(block);
            let actual = self.block(block).len();
            if expected != actual {
                return Err(CalibrationError::BlockLengthMismatch { block, expected, actual });
            }
        }
        Ok(())
    }
}
