//! Menter k-ω SST closure in kinematic form.
//!
//! ```text
//! ∂k/∂t + ∇·(U k) = Pk − β* k ω + ∇·((ν + σk νt) ∇k)
//! ∂ω/∂t + ∇·(U ω) = γ Pk/νt − β ω² + ∇·((ν + σω νt) ∇ω)
//!                   + 2 (1 − F1) σω2 ∇k·∇ω / ω
//! νt = a1 k / max(a1 ω, |S| F2),   Pk = min(νt |S|², c1 β* k ω)
//! ```
//!
//! Coefficients `σk, σω, γ, β` blend the inner and outer sets with `F1`.

use af_core::{Real, Vec3, WALL_DISTANCE_FLOOR};
use af_flow::{EddyView, FlowContext, MeanFlow, Reconstruction};
use af_mesh::PatchKind;
use tracing::debug;

use crate::kinematics::strain_rate;
use crate::model::TurbulenceModel;
use crate::options::{SstConstants, TurbulenceOptions};
use crate::scalar::{ScalarEquation, scalar_rule};

/// Lower bound of the cross-diffusion term inside `F1`.
const CD_KW_FLOOR: Real = 1e-20;

#[derive(Clone, Debug)]
pub struct KOmegaSst {
    constants: SstConstants,
    reconstruction: Reconstruction,
    /// `[k, ω]`.
    eqs: [ScalarEquation; 2],
    f1: Vec<Real>,
    mu_t: Vec<Real>,
}

impl SstConstants {
    /// Blending functions `(F1, F2)` of one cell.
    pub fn blending(&self, k: Real, omega: Real, nu: Real, d: Real, grad_k: &Vec3, grad_w: &Vec3) -> (Real, Real) {
        let d = d.max(WALL_DISTANCE_FLOOR);
        let d2 = d * d;
        let sqrt_k = k.sqrt();
        let viscous = 500.0 * nu / (d2 * omega);
        let cd = (2.0 * self.sigma_w2 * grad_k.dot(grad_w) / omega).max(CD_KW_FLOOR);

        let arg1 = (sqrt_k / (self.beta_star * omega * d))
            .max(viscous)
            .min(4.0 * self.sigma_w2 * k / (cd * d2));
        let arg2 = (2.0 * sqrt_k / (self.beta_star * omega * d)).max(viscous);
        (arg1.powi(4).tanh(), (arg2 * arg2).tanh())
    }

    /// Kinematic eddy viscosity `a1 k / max(a1 ω, |S| F2)`.
    pub fn eddy_viscosity(&self, k: Real, omega: Real, strain: Real, f2: Real) -> Real {
        self.a1 * k / (self.a1 * omega).max(strain * f2)
    }

    /// `ω` on a wall face whose owner centre sits at distance `d`.
    pub fn wall_omega(&self, nu: Real, d: Real) -> Real {
        let d = d.max(WALL_DISTANCE_FLOOR);
        60.0 * nu / (self.beta1 * d * d)
    }
}

/// Volumetric sources `(k, ω)` with their diagonal linearisations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SstSource {
    pub k: Real,
    pub k_implicit: Real,
    pub omega: Real,
    pub omega_implicit: Real,
}

impl SstConstants {
    #[allow(clippy::too_many_arguments)]
    pub fn source(
        &self,
        k: Real,
        omega: Real,
        nu_t: Real,
        strain: Real,
        f1: Real,
        grad_k: &Vec3,
        grad_w: &Vec3,
    ) -> SstSource {
        let s2 = strain * strain;
        let limit = self.c1 * self.beta_star * k * omega;
        let pk = (nu_t * s2).min(limit);
        let gamma = Self::blend(f1, self.gamma1, self.gamma2);
        let beta = Self::blend(f1, self.beta1, self.beta2);
        let production_w = if nu_t > 0.0 { gamma * pk / nu_t } else { gamma * s2 };
        let cross = 2.0 * (1.0 - f1) * self.sigma_w2 * grad_k.dot(grad_w) / omega;

        SstSource {
            k: pk - self.beta_star * k * omega,
            k_implicit: self.beta_star * omega,
            omega: production_w - beta * omega * omega + cross,
            omega_implicit: 2.0 * beta * omega,
        }
    }
}

impl KOmegaSst {
    pub const EQUATIONS: usize = 2;

    /// Free-stream `k∞ = 1.5 (I |U∞|)²` and `ω∞ = k∞ / (ratio · ν∞)`.
    pub fn free_stream(ctx: &FlowContext<'_>, flow: &MeanFlow, options: &TurbulenceOptions) -> Vec<Real> {
        let far = flow.far_field();
        let rho = ctx.thermo.conservative(&far).rho;
        let nu = ctx.thermo.viscosity(far.t) / rho;
        let fs = options.free_stream;
        let ti = fs.intensity * far.u.norm();
        let k = 1.5 * ti * ti;
        let omega = if nu > 0.0 { k / (fs.viscosity_ratio * nu) } else { 0.0 };
        vec![k, omega]
    }

    pub fn new(
        ctx: &FlowContext<'_>,
        flow: &MeanFlow,
        options: &TurbulenceOptions,
        k_far: Real,
        omega_far: Real,
    ) -> Self {
        let mesh = ctx.mesh;
        let n = mesh.n_cells();
        let k = ScalarEquation::new("k", mesh, k_far, options.floor, options.normalization);
        let w = ScalarEquation::new("omega", mesh, omega_far, options.floor, options.normalization);
        let mut model = Self {
            constants: options.sst,
            reconstruction: options.reconstruction,
            eqs: [k, w],
            f1: vec![0.0; n],
            mu_t: vec![0.0; n],
        };
        model.update(ctx, flow);
        debug!(k_far, omega_far, "k-omega SST initialised");
        model
    }

    pub fn k(&self) -> &ScalarEquation {
        &self.eqs[0]
    }

    pub fn omega(&self) -> &ScalarEquation {
        &self.eqs[1]
    }

    pub fn k_mut(&mut self) -> &mut ScalarEquation {
        &mut self.eqs[0]
    }

    pub fn omega_mut(&mut self) -> &mut ScalarEquation {
        &mut self.eqs[1]
    }

    /// Inner/outer blending function per cell.
    pub fn f1(&self) -> &[Real] {
        &self.f1
    }

    pub fn eddy_viscosity(&self) -> &[Real] {
        &self.mu_t
    }

    pub fn constants(&self) -> &SstConstants {
        &self.constants
    }
}

impl TurbulenceModel for KOmegaSst {
    fn name(&self) -> &'static str {
        "KappaOmega"
    }

    fn equations(&self) -> &[ScalarEquation] {
        &self.eqs
    }

    fn equations_mut(&mut self) -> &mut [ScalarEquation] {
        &mut self.eqs
    }

    fn entropy_fix(&self) -> Real {
        self.constants.fix
    }

    fn reconstruction(&self) -> Reconstruction {
        self.reconstruction
    }

    fn update(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow) {
        let mesh = ctx.mesh;
        let owner = mesh.owner();
        let d = mesh.wall_distance();
        let rho = flow.density();
        let mu = flow.laminar_viscosity();
        let nu = |i: usize| mu[i] / rho[i];
        let c = self.constants;
        let [k_eq, w_eq] = &mut self.eqs;

        let k_far = k_eq.free_stream();
        k_eq.update(ctx, |patch, f, _| scalar_rule(ctx, flow, patch, f, k_far, 0.0));
        let w_far = w_eq.free_stream();
        w_eq.update(ctx, |patch, f, _| {
            let l = owner[f];
            scalar_rule(ctx, flow, patch, f, w_far, c.wall_omega(nu(l), d[l]))
        });

        let grad_u = flow.velocity_gradient();
        for i in 0..self.mu_t.len() {
            let (k, w) = (k_eq.phi[i], w_eq.phi[i]);
            let (f1, f2) = c.blending(k, w, nu(i), d[i], &k_eq.grad[i], &w_eq.grad[i]);
            self.f1[i] = f1;
            self.mu_t[i] = rho[i] * c.eddy_viscosity(k, w, strain_rate(&grad_u[i]), f2);
        }
    }

    fn diffusion(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow) {
        let mesh = ctx.mesh;
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let rho = flow.density();
        let mu = flow.laminar_viscosity();
        let c = self.constants;
        let n = self.mu_t.len();

        let nu: Vec<Real> = (0..n).map(|i| mu[i] / rho[i]).collect();
        let nu_t: Vec<Real> = (0..n).map(|i| self.mu_t[i] / rho[i]).collect();
        let sigma_k: Vec<Real> = self
            .f1
            .iter()
            .map(|&f1| SstConstants::blend(f1, c.sigma_k1, c.sigma_k2))
            .collect();
        let sigma_w: Vec<Real> = self
            .f1
            .iter()
            .map(|&f1| SstConstants::blend(f1, c.sigma_w1, c.sigma_w2))
            .collect();

        let cells = |sigma: &[Real]| -> Vec<Real> { (0..n).map(|i| nu[i] + sigma[i] * nu_t[i]).collect() };
        let faces = |sigma: &[Real]| -> Vec<Real> {
            let mut g: Vec<Real> = (nif..mesh.n_faces())
                .map(|f| {
                    let l = owner[f];
                    nu[l] + sigma[l] * nu_t[l]
                })
                .collect();
            for patch in mesh.patches() {
                if patch.kind == PatchKind::Wall {
                    for f in patch.faces() {
                        g[f - nif] = nu[owner[f]];
                    }
                }
            }
            g
        };

        let [k_eq, w_eq] = &mut self.eqs;
        k_eq.diffuse(ctx, &cells(&sigma_k), &faces(&sigma_k));
        w_eq.diffuse(ctx, &cells(&sigma_w), &faces(&sigma_w));
    }

    fn source(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, unsteady: bool) {
        let v = ctx.mesh.volumes();
        let rho = flow.density();
        let grad_u = flow.velocity_gradient();
        let c = self.constants;
        let [k_eq, w_eq] = &mut self.eqs;

        for i in 0..self.mu_t.len() {
            let s = c.source(
                k_eq.phi[i],
                w_eq.phi[i],
                self.mu_t[i] / rho[i],
                strain_rate(&grad_u[i]),
                self.f1[i],
                &k_eq.grad[i],
                &w_eq.grad[i],
            );
            k_eq.add_source(i, v[i], s.k, s.k_implicit);
            w_eq.add_source(i, v[i], s.omega, s.omega_implicit);
        }

        if unsteady {
            self.unsteady(ctx, flow);
        }
    }

    fn eddy(&self) -> EddyView<'_> {
        EddyView::new(&self.mu_t, Some(self.eqs[0].values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_layer_selects_k_omega_set() {
        let c = SstConstants::default();
        let g = Vec3::zeros();
        let (f1, f2) = c.blending(1e-3, 1e4, 1.5e-5, 1e-5, &g, &g);
        assert!(f1 > 0.99);
        assert!(f2 > 0.99);
    }

    #[test]
    fn no_walls_selects_outer_set() {
        let c = SstConstants::default();
        let g = Vec3::new(1.0, 0.0, 0.0);
        let (f1, f2) = c.blending(1e-2, 10.0, 1.5e-5, Real::INFINITY, &g, &g);
        assert_eq!(f1, 0.0);
        assert_eq!(f2, 0.0);
    }

    #[test]
    fn eddy_viscosity_is_limited_by_strain() {
        let c = SstConstants::default();
        assert!((c.eddy_viscosity(1.0, 10.0, 0.0, 1.0) - 0.1).abs() < 1e-15);
        assert!(c.eddy_viscosity(1.0, 10.0, 1e3, 1.0) < 0.1);
    }

    #[test]
    fn production_limiter_caps_pk() {
        let c = SstConstants::default();
        let g = Vec3::zeros();
        let s = c.source(1.0, 1.0, 10.0, 100.0, 1.0, &g, &g);
        // Pk = min(1e5, c1 β* k ω = 0.9)
        assert!((s.k - (0.9 - 0.09)).abs() < 1e-12);
        assert_eq!(s.k_implicit, 0.09);
    }

    #[test]
    fn free_stream_decay_without_shear() {
        let c = SstConstants::default();
        let g = Vec3::zeros();
        let s = c.source(1e-3, 5.0, 2e-4, 0.0, 0.0, &g, &g);
        assert!(s.k < 0.0);
        assert!(s.omega < 0.0);
        assert!((s.omega + 0.0828 * 25.0).abs() < 1e-12);
    }

    #[test]
    fn wall_omega_is_finite_at_zero_distance() {
        let c = SstConstants::default();
        assert!(c.wall_omega(1.5e-5, 0.0).is_finite());
        assert!(c.wall_omega(1.5e-5, 1e-4) > c.wall_omega(1.5e-5, 1e-3));
    }
}
