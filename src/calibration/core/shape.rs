//! Model dimensions and the flat θ layout.
//!
//! Every dimension is read off the design matrices once, when
//! [`CalibrationData`](super::data::CalibrationData) is built:
//! - `n`: observations (length of `suvr`).
//! - `n_tracer`: columns of `x_tracer`.
//! - `n_h2h`: columns of `x_h2h_subj`.
//! - `n_anchor`: columns of `z_subj` (rows of `v_subj`).
//! - `n_var`: columns of `v`.
//! - `n_anchor_var`: columns of `v_subj`.
//!
//! θ is the concatenation of the six [`ParamBlock`]s in declaration order.
use std::ops::Range;

/// One named slice of θ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamBlock {
    SlopeTracer,
    InterceptTracer,
    CentaurH2hSubj,
    CentaurSubj,
    LogSigmaTracer,
    LogSigmaSubjGroup,
}

impl ParamBlock {
    /// All blocks in θ order.
    pub const ALL: [ParamBlock; 6] = [
        ParamBlock::SlopeTracer,
        ParamBlock::InterceptTracer,
        ParamBlock::CentaurH2hSubj,
        ParamBlock::CentaurSubj,
        ParamBlock::LogSigmaTracer,
        ParamBlock::LogSigmaSubjGroup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParamBlock::SlopeTracer => "slope_tracer",
            ParamBlock::InterceptTracer => "intercept_tracer",
            ParamBlock::CentaurH2hSubj => "centaur_h2h_subj",
            ParamBlock::CentaurSubj => "centaur_subj",
            ParamBlock::LogSigmaTracer => "log_sigma_tracer",
            ParamBlock::LogSigmaSubjGroup => "log_sigma_subj_group",
        }
    }
}

/// Dimensions of a calibration problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationShape {
    pub n: usize,
    pub n_tracer: usize,
    pub n_h2h: usize,
    pub n_anchor: usize,
    pub n_var: usize,
    pub n_anchor_var: usize,
}

impl CalibrationShape {
    /// Length of `block` in θ.
    pub fn block_len(&self, block: ParamBlock) -> usize {
        match block {
            ParamBlock::SlopeTracer | ParamBlock::InterceptTracer => self.n_tracer,
            ParamBlock::CentaurH2hSubj => self.n_h2h,
            ParamBlock::CentaurSubj => self.n_anchor,
            ParamBlock::LogSigmaTracer => self.n_var,
            ParamBlock::LogSigmaSubjGroup => self.n_anchor_var,
        }
    }

    /// Index range of `block` inside θ.
    pub fn block_range(&self, block: ParamBlock) -> Range<usize> {
        let start: usize = ParamBlock::ALL
            .iter()
            .take_while(|&&b| b != block)
            .map(|&b| self.block_len(b))
            .sum();
        start..start + self.block_len(block)
    }

    /// `2·n_tracer + n_h2h + n_anchor + n_var + n_anchor_var`.
    pub fn theta_len(&self) -> usize {
        ParamBlock::ALL.iter().map(|&b| self.block_len(b)).sum()
    }
}
