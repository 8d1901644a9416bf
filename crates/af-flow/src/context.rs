//! Borrowed collaborators handed to every operator.

use af_core::Real;
use af_mesh::{Communicator, Geometry};
use af_thermo::Thermodynamics;

/// Mesh, gas model and communicator for one operator call.
///
/// Operators take the context by reference instead of holding on to it, so
/// equation sets never own or alias the mesh.
#[derive(Clone, Copy)]
pub struct FlowContext<'a> {
    pub mesh: &'a dyn Geometry,
    pub thermo: &'a dyn Thermodynamics,
    pub comm: &'a dyn Communicator,
}

impl<'a> FlowContext<'a> {
    pub fn new(
        mesh: &'a dyn Geometry,
        thermo: &'a dyn Thermodynamics,
        comm: &'a dyn Communicator,
    ) -> Self {
        Self { mesh, thermo, comm }
    }
}

/// Read-only view of the turbulence closure seen by the mean flow.
///
/// Missing arrays read as zero, which is what a laminar or inviscid run sees.
#[derive(Clone, Copy, Debug, Default)]
pub struct EddyView<'a> {
    mu_t: Option<&'a [Real]>,
    k: Option<&'a [Real]>,
}

impl<'a> EddyView<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(mu_t: &'a [Real], k: Option<&'a [Real]>) -> Self {
        Self { mu_t: Some(mu_t), k }
    }

    /// Eddy viscosity of cell `i` [Pa·s].
    #[inline]
    pub fn mu_t(&self, i: usize) -> Real {
        self.mu_t.map_or(0.0, |m| m[i])
    }

    /// Turbulent kinetic energy of cell `i` [m²/s²].
    #[inline]
    pub fn k(&self, i: usize) -> Real {
        self.k.map_or(0.0, |k| k[i])
    }

    pub fn is_laminar(&self) -> bool {
        self.mu_t.is_none() && self.k.is_none()
    }
}
