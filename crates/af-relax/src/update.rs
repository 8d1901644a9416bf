//! Pseudo-time update kernels.
//!
//! `rhs` arrays hold volume-integrated residuals, so the explicit step is
//! `U = U₀ − α dτ χ R / V`, with χ the point-implicit dual-time factor.

use af_core::{FieldValue, Real};

/// Point-implicit factor `χ = Δt / (Δt + dτ)` of the unsteady term; 1 when steady.
#[inline]
pub fn implicit_factor(physical_dt: Option<Real>, dtau: Real) -> Real {
    match physical_dt {
        Some(dt) => dt / (dt + dtau),
        None => 1.0,
    }
}

/// Explicit stage update of one field.
pub fn explicit_update<T: FieldValue>(
    state: &mut [T],
    base: &[T],
    rhs: &[T],
    dtau: &[Real],
    volumes: &[Real],
    alpha: Real,
    physical_dt: Option<Real>,
) {
    for i in 0..state.len() {
        let chi = implicit_factor(physical_dt, dtau[i]);
        state[i] = base[i] - rhs[i] * (alpha * dtau[i] * chi / volumes[i]);
    }
}

/// Stage update of a scalar with a diagonal source linearisation `lhs` [1/s]:
/// `φ = (φ₀ − α dτ χ R / V) / (1 + α dτ χ lhs)`.
#[allow(clippy::too_many_arguments)]
pub fn point_implicit_update(
    state: &mut [Real],
    base: &[Real],
    rhs: &[Real],
    lhs: &[Real],
    dtau: &[Real],
    volumes: &[Real],
    alpha: Real,
    physical_dt: Option<Real>,
) {
    for i in 0..state.len() {
        let step = alpha * dtau[i] * implicit_factor(physical_dt, dtau[i]);
        state[i] = (base[i] - rhs[i] * step / volumes[i]) / (1.0 + step * lhs[i]);
    }
}
