//! Normal negative log-density in squared-scale form.
//!
//! `-ln N(x; μ, s) = ½ln(2π) + ½ln(s²) + ½(x − μ)²/s²`
//!
//! Writing the density through `s²` makes it even in `s`: a scale that went
//! negative through a negative tracer slope contributes exactly what `|s|`
//! would. `s = 0` is not special-cased; `ln(0)` and the division produce a
//! non-finite value.
use statrs::consts::LN_SQRT_2PI;

/// One normal term and its partial derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalTerm {
    pub value: f64,
    /// ∂/∂x = (x − μ)/s²
    pub d_x: f64,
    /// ∂/∂μ = −(x − μ)/s²
    pub d_mean: f64,
    /// ∂/∂s = 1/s − (x − μ)²/s³
    pub d_sd: f64,
}

#[inline]
pub fn neg_log_normal(x: f64, mean: f64, sd: f64) -> f64 {
    let r = x - mean;
    let var = sd * sd;
    LN_SQRT_2PI + 0.5 * var.ln() + 0.5 * r * r / var
}

#[inline]
pub fn neg_log_normal_term(x: f64, mean: f64, sd: f64) -> NormalTerm {
    let r = x - mean;
    let var = sd * sd;
    let z = r / var;
    NormalTerm {
        value: LN_SQRT_2PI + 0.5 * var.ln() + 0.5 * r * z,
        d_x: z,
        d_mean: -z,
        d_sd: 1.0 / sd - r * z / sd,
    }
}
