//! Closure coefficients and setup options.

use af_core::{Real, SCALAR_FLOOR};
use af_flow::Reconstruction;
use af_relax::Normalization;

use crate::error::{TurbulenceError, TurbulenceResult};

/// Spalart-Allmaras coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaConstants {
    pub sigma: Real,
    pub kappa: Real,
    pub cb1: Real,
    pub cb2: Real,
    pub cv1: Real,
    pub cw2: Real,
    pub cw3: Real,
    /// Weight of the strain/vorticity production correction.
    pub cprod: Real,
    /// Entropy fix of the scalar upwind flux.
    pub fix: Real,
}

impl Default for SaConstants {
    fn default() -> Self {
        Self {
            sigma: 2.0 / 3.0,
            kappa: 0.4187,
            cb1: 0.1355,
            cb2: 0.622,
            cv1: 7.1,
            cw2: 0.3,
            cw3: 2.0,
            cprod: 2.0,
            fix: 0.10,
        }
    }
}

impl SaConstants {
    /// `cw1 = cb1/κ² + (1 + cb2)/σ`.
    pub fn cw1(&self) -> Real {
        self.cb1 / (self.kappa * self.kappa) + (1.0 + self.cb2) / self.sigma
    }
}

/// Menter k-ω SST coefficients; index 1 is the inner (k-ω) set, 2 the outer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SstConstants {
    pub kappa: Real,
    pub sigma_k1: Real,
    pub sigma_k2: Real,
    pub sigma_w1: Real,
    pub sigma_w2: Real,
    pub gamma1: Real,
    pub gamma2: Real,
    pub beta1: Real,
    pub beta2: Real,
    pub beta_star: Real,
    pub a1: Real,
    /// Production limiter `Pk ≤ c1 β* k ω`.
    pub c1: Real,
    pub fix: Real,
}

impl Default for SstConstants {
    fn default() -> Self {
        Self {
            kappa: 0.41,
            sigma_k1: 0.85034,
            sigma_k2: 1.0,
            sigma_w1: 0.5,
            sigma_w2: 0.85616,
            gamma1: 0.5532,
            gamma2: 0.4403,
            beta1: 0.075,
            beta2: 0.0828,
            beta_star: 0.09,
            a1: 0.31,
            c1: 10.0,
            fix: 0.10,
        }
    }
}

impl SstConstants {
    /// `φ = F1 φ1 + (1 − F1) φ2`.
    #[inline]
    pub fn blend(f1: Real, inner: Real, outer: Real) -> Real {
        f1 * inner + (1.0 - f1) * outer
    }
}

/// Free-stream turbulence, derived from the mean-flow far field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeStream {
    /// `ν̃∞ / ν∞`.
    pub nu_tilde_ratio: Real,
    /// Turbulence intensity `I`, giving `k∞ = 1.5 (I |U∞|)²`.
    pub intensity: Real,
    /// `μt∞ / μ∞`, giving `ω∞ = k∞ / (ratio · ν∞)`.
    pub viscosity_ratio: Real,
}

impl Default for FreeStream {
    fn default() -> Self {
        Self {
            nu_tilde_ratio: 3.0,
            intensity: 0.01,
            viscosity_ratio: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurbulenceOptions {
    pub reconstruction: Reconstruction,
    pub normalization: Normalization,
    /// Lower bound of every transported scalar.
    pub floor: Real,
    pub free_stream: FreeStream,
    pub sa: SaConstants,
    pub sst: SstConstants,
}

impl Default for TurbulenceOptions {
    fn default() -> Self {
        Self {
            reconstruction: Reconstruction::default(),
            normalization: Normalization::default(),
            floor: SCALAR_FLOOR,
            free_stream: FreeStream::default(),
            sa: SaConstants::default(),
            sst: SstConstants::default(),
        }
    }
}

impl TurbulenceOptions {
    pub fn validate(&self) -> TurbulenceResult<()> {
        if !(self.floor.is_finite() && self.floor > 0.0) {
            return Err(TurbulenceError::InvalidArg {
                what: "scalar floor must be positive",
            });
        }
        let fs = self.free_stream;
        if !(fs.nu_tilde_ratio >= 0.0 && fs.intensity >= 0.0 && fs.viscosity_ratio > 0.0) {
            return Err(TurbulenceError::InvalidArg {
                what: "free-stream turbulence ratios must be non-negative",
            });
        }
        if !(self.sa.sigma > 0.0 && self.sa.kappa > 0.0 && self.sst.kappa > 0.0) {
            return Err(TurbulenceError::InvalidArg {
                what: "closure coefficients must be positive",
            });
        }
        Ok(())
    }
}
