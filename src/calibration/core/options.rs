//! Estimation options for calibration models.
use crate::{calibration::core::variance::ScaleMode, optimization::loglik_optimizer::MLEOptions};

/// CalibrationOptions — estimation configuration for a calibration fit.
///
/// Fields
/// ------
/// - `mle_opts`: [`MLEOptions`]
///   Optimizer configuration (tolerances, iteration cap, line search,
///   L-BFGS memory, verbosity).
/// - `scale_mode`: [`ScaleMode`]
///   Handling of non-positive or near-zero standard deviations. Defaults to
///   `Unguarded`.
///
/// Invariants
/// ----------
/// - Both fields are built through their own validated constructors;
///   `CalibrationOptions` adds no extra checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalibrationOptions {
    pub mle_opts: MLEOptions,
    pub scale_mode: ScaleMode,
}

impl CalibrationOptions {
    pub fn new(mle_opts: MLEOptions, scale_mode: ScaleMode) -> Self {
        CalibrationOptions { mle_opts, scale_mode }
    }
}
