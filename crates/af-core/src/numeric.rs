use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Lower bound applied to density after every update.
pub const DENSITY_FLOOR: Real = 1e-10;

/// Lower bound applied to turbulence scalars (ν̃, k, ω) after every update.
pub const SCALAR_FLOOR: Real = 1e-10;

/// Wall distances below this are treated as this value inside source terms.
pub const WALL_DISTANCE_FLOOR: Real = 1e-12;

/// Reference used by residual normalisation before any residual is seen.
pub const RESIDUAL_REFERENCE_FLOOR: Real = 1e-16;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Reject non-finite or non-positive input.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::InvalidArg { what })
    }
}

/// Clamp `v` from below. NaN stays NaN so divergence is visible to the caller.
#[inline]
pub fn floor_clamp(v: Real, floor: Real) -> Real {
    if v < floor { floor } else { v }
}

#[inline]
pub fn sqr(v: Real) -> Real {
    v * v
}
