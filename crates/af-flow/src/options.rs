//! Resolved numerical options of the mean-flow equations.

use af_core::{DENSITY_FLOOR, Real};
use af_relax::Normalization;

use crate::error::{FlowError, FlowResult};
use crate::limiter::Limiter;

/// Which fluxes are assembled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Physics {
    /// Inviscid; `diffusion` is a no-op.
    Euler,
    /// Laminar plus eddy viscosity.
    #[default]
    NavierStokes,
}

/// Face-state reconstruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconstruction {
    FirstOrder,
    /// Limited MUSCL on the extended stencil, first order where the stencil is incomplete.
    Muscl(Limiter),
}

impl Default for Reconstruction {
    fn default() -> Self {
        Reconstruction::Muscl(Limiter::MinMod)
    }
}

/// Harten entropy-fix coefficients, relative to `|ũₙ| + c̃`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntropyFix {
    /// Entropy and shear waves (`λ = ũₙ`).
    pub linear: Real,
    /// Acoustic waves (`λ = ũₙ ± c̃`).
    pub nonlinear: Real,
}

impl Default for EntropyFix {
    fn default() -> Self {
        Self {
            linear: 0.05,
            nonlinear: 0.05,
        }
    }
}

/// Local or global pseudo time step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeStepping {
    #[default]
    Local,
    /// Every cell takes the smallest step of the domain.
    Global,
}

/// Bound on local time steps, as a multiple of a minimum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DtBound {
    None,
    /// `dtᵢ ≤ ratio · min over the whole domain`.
    Global { ratio: Real },
    /// `dtᵢ ≤ ratio · min over cell i and its face neighbours`.
    Local { ratio: Real },
}

impl Default for DtBound {
    fn default() -> Self {
        DtBound::Global { ratio: 100.0 }
    }
}

/// Options fixed at construction of `MeanFlow`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowOptions {
    pub physics: Physics,
    pub reconstruction: Reconstruction,
    pub entropy_fix: EntropyFix,
    /// Roe (√ρ-weighted) face averages; arithmetic means otherwise.
    pub roe_average: bool,
    pub density_floor: Real,
    pub normalization: Normalization,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            physics: Physics::default(),
            reconstruction: Reconstruction::default(),
            entropy_fix: EntropyFix::default(),
            roe_average: true,
            density_floor: DENSITY_FLOOR,
            normalization: Normalization::default(),
        }
    }
}

impl FlowOptions {
    pub fn euler() -> Self {
        Self {
            physics: Physics::Euler,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> FlowResult<()> {
        let fix = self.entropy_fix;
        for v in [fix.linear, fix.nonlinear] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(FlowError::InvalidArg {
                    what: "entropy-fix coefficients must be non-negative",
                });
            }
        }
        if !(self.density_floor.is_finite() && self.density_floor > 0.0) {
            return Err(FlowError::InvalidArg {
                what: "density floor must be positive",
            });
        }
        Ok(())
    }
}

impl DtBound {
    pub fn validate(&self) -> FlowResult<()> {
        match *self {
            DtBound::Global { ratio } | DtBound::Local { ratio } if !(ratio >= 1.0) => {
                Err(FlowError::InvalidArg {
                    what: "time-step bound ratio must be at least 1",
                })
            }
            _ => Ok(()),
        }
    }
}
