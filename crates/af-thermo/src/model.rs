//! Thermodynamics trait.

use af_core::Real;

use crate::state::{Conservative, Primitive};

/// Equation of state and transport properties.
///
/// Implementations must be thread-safe (Send + Sync) and deterministic: the
/// same input always gives bit-identical output, which free-stream
/// preservation relies on.
pub trait Thermodynamics: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Ratio of specific heats.
    fn gamma(&self) -> Real;

    /// Specific gas constant [J/(kg·K)].
    fn gas_constant(&self) -> Real;

    /// Specific heat at constant pressure [J/(kg·K)].
    fn cp(&self) -> Real {
        self.gamma() * self.gas_constant() / (self.gamma() - 1.0)
    }

    /// Laminar Prandtl number.
    fn prandtl(&self) -> Real;

    /// Turbulent Prandtl number.
    fn prandtl_turbulent(&self) -> Real;

    /// Laminar dynamic viscosity at temperature `t` [Pa·s].
    fn viscosity(&self, t: Real) -> Real;

    fn conservative(&self, prim: &Primitive) -> Conservative;

    fn primitive(&self, cons: &Conservative) -> Primitive;

    /// Speed of sound from pressure and density.
    fn sound_speed(&self, p: Real, rho: Real) -> Real {
        (self.gamma() * p / rho).sqrt()
    }

    /// Specific total enthalpy `(Eₜ + p)/ρ`.
    fn total_enthalpy(&self, cons: &Conservative, p: Real) -> Real {
        (cons.et + p) / cons.rho
    }
}
