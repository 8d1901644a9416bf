//! Calorically perfect gas.

use af_core::{Real, ensure_positive};

use crate::error::{ThermoError, ThermoResult};
use crate::model::Thermodynamics;
use crate::state::{Conservative, Primitive};

/// Laminar viscosity law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viscosity {
    /// Inviscid gas, μ = 0.
    None,
    /// Constant viscosity [Pa·s].
    Constant(Real),
    /// Sutherland's law `μ = μ_ref (T/T_ref)^{3/2} (T_ref + S)/(T + S)`.
    Sutherland { mu_ref: Real, t_ref: Real, s: Real },
}

impl Viscosity {
    /// Sutherland constants for air.
    pub const AIR: Viscosity = Viscosity::Sutherland {
        mu_ref: 1.716e-5,
        t_ref: 273.15,
        s: 110.4,
    };

    pub fn at(&self, t: Real) -> Real {
        match *self {
            Viscosity::None => 0.0,
            Viscosity::Constant(mu) => mu,
            Viscosity::Sutherland { mu_ref, t_ref, s } => {
                mu_ref * (t / t_ref).powf(1.5) * (t_ref + s) / (t + s)
            }
        }
    }
}

/// Perfect gas `p = ρ R T`, `Eₜ = p/(γ−1) + ½ρ|U|²`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfectGas {
    r: Real,
    gamma: Real,
    pr: Real,
    prt: Real,
    viscosity: Viscosity,
}

impl PerfectGas {
    /// Validate and create a gas model.
    pub fn new(r: Real, gamma: Real, pr: Real, prt: Real, viscosity: Viscosity) -> ThermoResult<Self> {
        ensure_positive(r, "gas constant")?;
        ensure_positive(pr, "Prandtl number")?;
        ensure_positive(prt, "turbulent Prandtl number")?;
        if !(gamma.is_finite() && gamma > 1.0) {
            return Err(ThermoError::InvalidArg {
                what: "gamma must exceed 1",
            });
        }
        match viscosity {
            Viscosity::Constant(mu) if !(mu.is_finite() && mu >= 0.0) => {
                return Err(ThermoError::InvalidArg {
                    what: "viscosity must be non-negative",
                });
            }
            Viscosity::Sutherland { mu_ref, t_ref, s } => {
                ensure_positive(mu_ref, "Sutherland reference viscosity")?;
                ensure_positive(t_ref, "Sutherland reference temperature")?;
                ensure_positive(s, "Sutherland constant")?;
            }
            _ => {}
        }
        Ok(Self {
            r,
            gamma,
            pr,
            prt,
            viscosity,
        })
    }

    /// Air with Sutherland viscosity.
    pub fn air() -> Self {
        Self {
            r: 287.0,
            gamma: 1.4,
            pr: 0.72,
            prt: 0.9,
            viscosity: Viscosity::AIR,
        }
    }

    pub fn with_viscosity(mut self, viscosity: Viscosity) -> Self {
        self.viscosity = viscosity;
        self
    }

    pub fn viscosity_law(&self) -> Viscosity {
        self.viscosity
    }
}

impl Default for PerfectGas {
    fn default() -> Self {
        Self::air()
    }
}

impl Thermodynamics for PerfectGas {
    fn name(&self) -> &str {
        "perfect gas"
    }

    fn gamma(&self) -> Real {
        self.gamma
    }

    fn gas_constant(&self) -> Real {
        self.r
    }

    fn prandtl(&self) -> Real {
        self.pr
    }

    fn prandtl_turbulent(&self) -> Real {
        self.prt
    }

    fn viscosity(&self, t: Real) -> Real {
        self.viscosity.at(t)
    }

    fn conservative(&self, prim: &Primitive) -> Conservative {
        let rho = prim.p / (self.r * prim.t);
        Conservative {
            rho,
            m: prim.u * rho,
            et: prim.p / (self.gamma - 1.0) + 0.5 * rho * prim.u.norm_squared(),
        }
    }

    fn primitive(&self, cons: &Conservative) -> Primitive {
        let u = cons.m / cons.rho;
        let p = (self.gamma - 1.0) * (cons.et - 0.5 * cons.rho * u.norm_squared());
        Primitive {
            p,
            u,
            t: p / (cons.rho * self.r),
        }
    }
}
