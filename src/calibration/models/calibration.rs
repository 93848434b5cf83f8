//! Hierarchical SUVR→CenTauR calibration model: NLL, analytic gradient, fit.
//!
//! This module wires the calibration likelihood to the [`LogLikelihood`]
//! trait. A flat θ is split into [`CalibrationParams`], the two log-variance
//! blocks are exponentiated once, and the NLL is the sum of
//! - the random-effect prior terms of every anchor subject, and
//! - the observation terms of every SUVR measurement.
//!
//! The gradient is derived by hand. Each accumulator adds its partials into
//! a zero [`CalibrationParams`], which is then flattened in θ order. The
//! optimizer maximizes `ℓ(θ) = -NLL(θ)`, so `value` and `grad` flip signs.
use crate::{
    calibration::{
        core::{
            data::CalibrationData,
            observation::{accumulate_observation_grad, observation_nll},
            options::CalibrationOptions,
            params::CalibrationParams,
            prior::{accumulate_prior_grad, prior_nll},
            shape::{CalibrationShape, ParamBlock},
            validation::validate_theta,
            variance::VarianceScales,
        },
        errors::{CalibrationError, CalibrationResult},
    },
    inference::hessian::calc_standard_errors,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, LogLikelihood, OptimOutcome, Theta, maximize},
        numerical_stability::transformations::exp_link_se,
    },
};
use ndarray::{Array1, ArrayView1, s};

/// Calibration model with analytic NLL and gradient.
///
/// Holds the parameter dimensions (`shape`), estimation options, and, after
/// [`fit`](CalibrationModel::fit), the optimizer outcome and the fitted
/// parameter blocks.
///
/// # Notes
/// - `shape.n` records the dataset the model was built for. Evaluation only
///   requires the parameter dimensions to agree, so the same model can score
///   another dataset with the same design columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationModel {
    pub shape: CalibrationShape,
    pub options: CalibrationOptions,
    /// Fit results (populated after `fit`).
    pub results: Option<OptimOutcome>,
    /// Fitted parameters (populated after `fit`).
    pub fitted_params: Option<CalibrationParams>,
}

/// Fitted scale components with delta-method standard errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleEstimates {
    /// `exp(log_sigma_tracer)` at θ̂.
    pub residual: Array1<f64>,
    pub residual_se: Array1<f64>,
    /// `exp(log_sigma_subj_group)` at θ̂.
    pub subject: Array1<f64>,
    pub subject_se: Array1<f64>,
}

impl CalibrationModel {
    pub fn new(shape: CalibrationShape, options: CalibrationOptions) -> CalibrationModel {
        CalibrationModel { shape, options, results: None, fitted_params: None }
    }

    /// Model sized for `data`.
    pub fn for_data(data: &CalibrationData, options: CalibrationOptions) -> CalibrationModel {
        CalibrationModel::new(data.shape(), options)
    }

    /// Negative log-likelihood at `params`.
    ///
    /// A non-positive standard deviation is not an error: under
    /// `ScaleMode::Unguarded` it yields a non-finite `Ok` value.
    ///
    /// # Errors
    /// - [`CalibrationError::ShapeMismatch`] if `data` has different design
    ///   dimensions than the model.
    /// - [`CalibrationError::BlockLengthMismatch`] if a block of `params`
    ///   has the wrong length.
    pub fn nll(&self, params: &CalibrationParams, data: &CalibrationData) -> CalibrationResult<f64> {
        self.check_inputs(params, data)?;
        let scales = VarianceScales::from_params(params);
        let mode = self.options.scale_mode;
        Ok(prior_nll(params, &scales, data, mode) + observation_nll(params, &scales, data, mode))
    }

    /// Gradient of [`nll`](CalibrationModel::nll) with respect to every
    /// parameter block, in the same block structure as `params`.
    ///
    /// # Errors
    /// Same as [`nll`](CalibrationModel::nll).
    pub fn nll_grad(
        &self, params: &CalibrationParams, data: &CalibrationData,
    ) -> CalibrationResult<CalibrationParams> {
        self.check_inputs(params, data)?;
        let scales = VarianceScales::from_params(params);
        let mode = self.options.scale_mode;
        let mut grad = CalibrationParams::zeros(&self.shape);
        accumulate_prior_grad(params, &scales, data, mode, &mut grad);
        accumulate_observation_grad(params, &scales, data, mode, &mut grad);
        Ok(grad)
    }

    /// Fit by maximum likelihood from `theta0` and cache the outcome.
    ///
    /// ## Steps
    /// 1. Check `data` against the model shape and split `theta0` into
    ///    blocks; a non-finite starting NLL is logged as a warning.
    /// 2. Run L-BFGS per `options.mle_opts` on `ℓ = -NLL`. Trial points with
    ///    a non-finite NLL cost `+∞`, so the default backtracking line search
    ///    contracts back toward finite values.
    /// 3. Store the outcome in `self.results` and the θ̂ blocks in
    ///    `self.fitted_params`.
    ///
    /// # Errors
    /// - Shape or θ validation failures, mapped to [`OptError`].
    /// - [`OptError::NonFiniteCost`] when the NLL at `theta0` is non-finite.
    /// - [`OptError::SolverAborted`] when an iteration fails, e.g. a Wolfe
    ///   line search that needs a gradient where some scale is zero.
    ///
    /// Nothing is cached on error.
    pub fn fit(&mut self, theta0: Array1<f64>, data: &CalibrationData) -> OptResult<()> {
        let start = CalibrationParams::from_theta(theta0.view(), &self.shape)?;
        let nll0 = self.nll(&start, data)?;
        if !nll0.is_finite() {
            log::warn!("starting NLL is non-finite ({nll0}); a standard deviation is zero at theta0");
        }
        log::debug!(
            "fitting calibration model: {} observations, {} parameters, nll(theta0) = {nll0:.6}",
            data.suvr.len(),
            self.shape.theta_len()
        );

        let outcome = maximize(&*self, theta0, data, &self.options.mle_opts)?;
        if outcome.converged {
            log::debug!("calibration fit converged after {} iterations", outcome.iterations);
        } else {
            log::warn!(
                "calibration fit stopped without converging after {} iterations: {}",
                outcome.iterations,
                outcome.status
            );
        }
        let fitted = CalibrationParams::from_theta(outcome.theta_hat.view(), &self.shape)?;
        self.results = Some(outcome);
        self.fitted_params = Some(fitted);
        Ok(())
    }

    /// Observed-information standard errors of θ̂, in θ order.
    ///
    /// The information matrix is the finite-difference Jacobian of the
    /// analytic NLL gradient at θ̂; its eigen-pseudoinverse gives the
    /// covariance. Log-variance entries are on the log scale; see
    /// [`scale_estimates`](CalibrationModel::scale_estimates) for `σ`.
    ///
    /// # Errors
    /// - [`OptError::ModelNotFitted`] before [`fit`](CalibrationModel::fit).
    /// - Shape mismatches and non-finite curvature at θ̂.
    pub fn standard_errors(&self, data: &CalibrationData) -> OptResult<Array1<f64>> {
        let theta_hat = &self.results.as_ref().ok_or(OptError::ModelNotFitted)?.theta_hat;
        self.check_data(data)?;
        let grad_fn = |theta: &Array1<f64>| {
            self.nll_grad_theta(theta.view(), data)
                .unwrap_or_else(|_| Array1::from_elem(theta.len(), f64::NAN))
        };
        calc_standard_errors(&grad_fn, theta_hat)
    }

    /// Fitted `σ` blocks with `se(σ) = σ · se(log σ)`.
    ///
    /// # Errors
    /// Same as [`standard_errors`](CalibrationModel::standard_errors).
    pub fn scale_estimates(&self, data: &CalibrationData) -> OptResult<ScaleEstimates> {
        let params = self.fitted_params.as_ref().ok_or(OptError::ModelNotFitted)?;
        let se = self.standard_errors(data)?;
        let scales = VarianceScales::from_params(params);
        let residual_se = exp_link_se(
            scales.residual.view(),
            se.slice(s![self.shape.block_range(ParamBlock::LogSigmaTracer)]),
        );
        let subject_se = exp_link_se(
            scales.subject.view(),
            se.slice(s![self.shape.block_range(ParamBlock::LogSigmaSubjGroup)]),
        );
        Ok(ScaleEstimates {
            residual: scales.residual,
            residual_se,
            subject: scales.subject,
            subject_se,
        })
    }

    /// Shape checks shared by every evaluation entry point.
    pub(crate) fn check_inputs(
        &self, params: &CalibrationParams, data: &CalibrationData,
    ) -> CalibrationResult<()> {
        self.check_data(data)?;
        params.check_shape(&self.shape)
    }

    fn check_data(&self, data: &CalibrationData) -> CalibrationResult<()> {
        let actual = data.shape();
        let dims = [
            ("n_tracer", self.shape.n_tracer, actual.n_tracer),
            ("n_h2h", self.shape.n_h2h, actual.n_h2h),
            ("n_anchor", self.shape.n_anchor, actual.n_anchor),
            ("n_var", self.shape.n_var, actual.n_var),
            ("n_anchor_var", self.shape.n_anchor_var, actual.n_anchor_var),
        ];
        for (what, expected, actual) in dims {
            if expected != actual {
                return Err(CalibrationError::ShapeMismatch { what, expected, actual });
            }
        }
        Ok(())
    }

    fn nll_grad_theta(
        &self, theta: ArrayView1<f64>, data: &CalibrationData,
    ) -> CalibrationResult<Array1<f64>> {
        let params = CalibrationParams::from_theta(theta, &self.shape)?;
        Ok(self.nll_grad(&params, data)?.to_theta())
    }
}

impl LogLikelihood for CalibrationModel {
    type Data = CalibrationData;

    /// `ℓ(θ) = -NLL(θ)`.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        let params = CalibrationParams::from_theta(theta.view(), &self.shape)?;
        Ok(-self.nll(&params, data)?)
    }

    /// Checks θ length and finiteness, and the data's design dimensions.
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        validate_theta(theta.view(), &self.shape)?;
        self.check_data(data)?;
        Ok(())
    }

    /// `∇ℓ(θ) = -∇NLL(θ)`, flattened in θ order.
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        Ok(-self.nll_grad_theta(theta.view(), data)?)
    }
}
