//! Physical boundary treatment of the mean flow.
//!
//! Walls and symmetry planes carry only a pressure flux plus whatever mass
//! crosses through transpiration. Far-field faces see a fixed ghost state,
//! extrapolated faces the owner state, and coupled faces the halo.

use af_core::{Real, Vec3};
use af_mesh::{BoundaryRule, Patch, PatchKind};

use crate::options::Physics;
use crate::roe::Flux;

/// Flux per unit area through an impermeable (or transpiring) face.
///
/// `vn` is the normal speed of the face and `vt` the transpiration velocity
/// relative to it.
pub fn wall_flux(rho: Real, m: Vec3, et: Real, p: Real, n: &Vec3, vn: Real, vt: Real) -> Flux {
    Flux {
        rho: rho * vt,
        m: m * vt + n * p,
        et: et * vt + p * (vn + vt),
    }
}

/// Velocity seen on boundary faces by gradients and viscous fluxes.
pub(crate) fn velocity_rule(
    patch: &Patch,
    physics: Physics,
    inside: Vec3,
    n: Vec3,
    vn: Real,
    vt: Real,
    far: Vec3,
) -> BoundaryRule<Vec3> {
    match patch.kind {
        PatchKind::Wall => match physics {
            Physics::NavierStokes => BoundaryRule::Fixed(n * (vn + vt)),
            Physics::Euler => BoundaryRule::Fixed(inside - n * (inside.dot(&n) - vn - vt)),
        },
        PatchKind::Symmetry => BoundaryRule::Fixed(inside - n * (inside.dot(&n) - vn)),
        PatchKind::FarField => BoundaryRule::Fixed(far),
        _ => BoundaryRule::ZeroGradient,
    }
}

/// Temperature on boundary faces; walls are adiabatic.
pub(crate) fn temperature_rule(patch: &Patch, far: Real) -> BoundaryRule<Real> {
    match patch.kind {
        PatchKind::FarField => BoundaryRule::Fixed(far),
        _ => BoundaryRule::ZeroGradient,
    }
}

/// Whether viscous stresses act on faces of this patch.
pub(crate) fn is_viscous(kind: &PatchKind) -> bool {
    !matches!(kind, PatchKind::Empty | PatchKind::Symmetry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_wall_carries_pressure_only() {
        let n = Vec3::new(0.0, 1.0, 0.0);
        let f = wall_flux(1.2, Vec3::new(12.0, 3.0, 0.0), 2.5e5, 1.0e5, &n, 0.0, 0.0);
        assert_eq!(f.rho, 0.0);
        assert_eq!(f.m, Vec3::new(0.0, 1.0e5, 0.0));
        assert_eq!(f.et, 0.0);
    }

    #[test]
    fn moving_wall_does_work() {
        let n = Vec3::x();
        let f = wall_flux(1.0, Vec3::zeros(), 1.0, 2.0, &n, 0.5, 0.0);
        assert_eq!(f.rho, 0.0);
        assert_eq!(f.et, 1.0);
    }

    #[test]
    fn transpiration_carries_mass() {
        let n = Vec3::x();
        let f = wall_flux(2.0, Vec3::new(1.0, 0.0, 0.0), 3.0, 1.0, &n, 0.0, 0.25);
        assert_eq!(f.rho, 0.5);
        assert_eq!(f.et, 0.75 + 0.25);
    }
}
