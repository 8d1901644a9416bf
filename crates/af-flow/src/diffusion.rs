//! Viscous fluxes of the mean flow.
//!
//! Face gradients are the weighted cell gradients with the component along
//! the centre-to-centre direction replaced by the compact difference, so a
//! uniform field gives exactly zero stress.

use af_core::{FieldValue, Real, Tensor, Vec3};
use af_mesh::{PatchKind, face_interpolate};

use crate::boundary;
use crate::context::{EddyView, FlowContext};
use crate::navier_stokes::MeanFlow;
use crate::options::Physics;
use crate::roe::Flux;

/// Face gradient with the compact correction along `d`.
pub fn corrected_gradient<T: FieldValue>(mean: T::Gradient, left: T, right: T, d: &Vec3) -> T::Gradient {
    let dist = d.norm();
    let e = d / dist;
    let c = (right - left) * (1.0 / dist) - T::along(&mean, &e);
    mean + c.outer(&e)
}

/// Viscous stress `μ (∇U + ∇Uᵀ − ⅔ (∇·U) I) − ⅔ ρ k I`.
pub fn stress(grad: &Tensor, mu: Real, rho: Real, k: Real) -> Tensor {
    let div = grad.trace();
    (grad + grad.transpose() - Tensor::identity() * (2.0 / 3.0 * div)) * mu
        - Tensor::identity() * (2.0 / 3.0 * rho * k)
}

impl MeanFlow {
    /// Viscous flux of every face, area included, oriented owner → neighbour.
    ///
    /// Symmetry and empty faces carry none. Returns all zeros for inviscid runs.
    pub fn viscous_fluxes(&self, ctx: &FlowContext<'_>, eddy: &EddyView<'_>) -> Vec<Flux> {
        let mesh = ctx.mesh;
        let thermo = ctx.thermo;
        let mut fluxes = vec![Flux::zero(); mesh.n_faces()];
        if self.options.physics == Physics::Euler {
            return fluxes;
        }

        let cp = thermo.cp();
        let pr = thermo.prandtl();
        let prt = thermo.prandtl_turbulent();
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let neighbour = mesh.neighbour();
        let w = mesh.weights();
        let sf = mesh.area_vectors();

        let face_flux = |f: usize, side: FaceSide| -> Flux {
            let d = mesh.delta(f);
            let g_u = corrected_gradient::<Vec3>(side.grad_u, side.u_l, side.u_r, &d);
            let g_t = corrected_gradient::<Real>(side.grad_t, side.t_l, side.t_r, &d);
            let tau = stress(&g_u, side.mu + side.mu_t, side.rho, side.k);
            let kappa = cp * (side.mu / pr + side.mu_t / prt);
            let traction = tau * sf[f];
            Flux {
                rho: 0.0,
                m: -traction,
                et: -(traction.dot(&side.u_f) + kappa * g_t.dot(&sf[f])),
            }
        };

        for f in 0..nif {
            let (l, r) = (owner[f], neighbour[f]);
            let wf = w[f];
            let side = FaceSide {
                u_l: self.u[l],
                u_r: self.u[r],
                t_l: self.t[l],
                t_r: self.t[r],
                u_f: face_interpolate(wf, self.u[l], self.u[r]),
                grad_u: self.grad_u[r] + (self.grad_u[l] - self.grad_u[r]) * wf,
                grad_t: face_interpolate(wf, self.grad_t[l], self.grad_t[r]),
                mu: face_interpolate(wf, self.mu[l], self.mu[r]),
                mu_t: face_interpolate(wf, eddy.mu_t(l), eddy.mu_t(r)),
                rho: face_interpolate(wf, self.rho[l], self.rho[r]),
                k: face_interpolate(wf, eddy.k(l), eddy.k(r)),
            };
            fluxes[f] = face_flux(f, side);
        }

        for patch in mesh.patches() {
            if !boundary::is_viscous(&patch.kind) {
                continue;
            }
            let wall = matches!(patch.kind, PatchKind::Wall);
            for f in patch.faces() {
                let b = f - nif;
                let l = owner[f];
                let (u_r, t_r) = if patch.kind.is_coupled() {
                    (self.u_halo.near(b), self.t_halo.near(b))
                } else {
                    (self.u_bnd[b], self.t_bnd[b])
                };
                let (mu_t, k) = if wall { (0.0, 0.0) } else { (eddy.mu_t(l), eddy.k(l)) };
                let side = FaceSide {
                    u_l: self.u[l],
                    u_r,
                    t_l: self.t[l],
                    t_r,
                    u_f: self.u_bnd[b],
                    grad_u: self.grad_u[l],
                    grad_t: self.grad_t[l],
                    mu: thermo.viscosity(self.t_bnd[b]),
                    mu_t,
                    rho: self.rho[l],
                    k,
                };
                fluxes[f] = face_flux(f, side);
            }
        }
        fluxes
    }

    /// Add the viscous fluxes (laminar plus eddy viscosity) to rhs.
    pub fn diffusion(&mut self, ctx: &FlowContext<'_>, eddy: &EddyView<'_>) {
        if self.options.physics == Physics::Euler {
            return;
        }
        let fluxes = self.viscous_fluxes(ctx, eddy);
        self.scatter(ctx, &fluxes);
    }
}

/// Face data of one viscous flux evaluation.
#[derive(Clone, Copy)]
struct FaceSide {
    u_l: Vec3,
    u_r: Vec3,
    t_l: Real,
    t_r: Real,
    u_f: Vec3,
    grad_u: Tensor,
    grad_t: Vec3,
    mu: Real,
    mu_t: Real,
    rho: Real,
    k: Real,
}
