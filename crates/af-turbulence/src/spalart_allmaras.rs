//! One-equation Spalart-Allmaras closure for `ν̃`.
//!
//! ```text
//! ∂ν̃/∂t + ∇·(U ν̃) = cb1 S̃ ν̃ − cw1 fw (ν̃/d)²
//!                    + (1/σ) [∇·((ν + ν̃) ∇ν̃) + cb2 |∇ν̃|²]
//! μt = ρ ν̃ fv1
//! ```
//!
//! The vorticity in `S̃` carries the strain/vorticity production correction
//! `Ω + Cprod min(0, |S| − Ω)`.

use af_core::{Real, WALL_DISTANCE_FLOOR};
use af_flow::{EddyView, FlowContext, MeanFlow, Reconstruction};
use tracing::debug;

use crate::kinematics::{strain_rate, vorticity};
use crate::model::TurbulenceModel;
use crate::options::{SaConstants, TurbulenceOptions};
use crate::scalar::{ScalarEquation, scalar_rule};

/// Spalart-Allmaras state on one partition.
#[derive(Clone, Debug)]
pub struct SpalartAllmaras {
    constants: SaConstants,
    reconstruction: Reconstruction,
    eqs: [ScalarEquation; 1],
    mu_t: Vec<Real>,
}

/// `fv1 = χ³ / (χ³ + cv1³)`.
#[inline]
pub fn fv1(chi: Real, cv1: Real) -> Real {
    let chi3 = chi * chi * chi;
    chi3 / (chi3 + cv1 * cv1 * cv1)
}

/// Volumetric source terms of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaSource {
    pub production: Real,
    pub destruction: Real,
    /// Diagonal linearisation of the destruction [1/s].
    pub implicit: Real,
}

impl SaConstants {
    /// Production and destruction of `ν̃` at wall distance `d`.
    ///
    /// Finite for any `d ≥ 0` (floored) including an infinite one.
    pub fn source(&self, nu_tilde: Real, nu: Real, d: Real, vorticity: Real, strain: Real) -> SaSource {
        let d = d.max(WALL_DISTANCE_FLOOR);
        let kd2 = self.kappa * self.kappa * d * d;
        let chi = nu_tilde / nu;
        let f1 = fv1(chi, self.cv1);
        let fv2 = 1.0 - chi / (1.0 + chi * f1);

        let omega = vorticity + self.cprod * (strain - vorticity).min(0.0);
        let s_tilde = (omega + nu_tilde * fv2 / kd2).max(0.3 * omega);

        let denom = s_tilde * kd2;
        let r = if denom.is_finite() && denom > 0.0 {
            (nu_tilde / denom).min(10.0)
        } else {
            10.0
        };
        let g = r + self.cw2 * (r.powi(6) - r);
        let cw3_6 = self.cw3.powi(6);
        let fw = g * ((1.0 + cw3_6) / (g.powi(6) + cw3_6)).powf(1.0 / 6.0);

        let cw1 = self.cw1();
        let nd = nu_tilde / d;
        SaSource {
            production: self.cb1 * s_tilde * nu_tilde,
            destruction: cw1 * fw * nd * nd,
            implicit: 2.0 * cw1 * fw * nu_tilde / (d * d),
        }
    }
}

impl SpalartAllmaras {
    pub const EQUATIONS: usize = 1;

    /// Free-stream `ν̃∞ = ratio · ν∞`.
    pub fn free_stream(ctx: &FlowContext<'_>, flow: &MeanFlow, options: &TurbulenceOptions) -> Vec<Real> {
        let far = flow.far_field();
        let rho = ctx.thermo.conservative(&far).rho;
        let nu = ctx.thermo.viscosity(far.t) / rho;
        vec![options.free_stream.nu_tilde_ratio * nu]
    }

    pub fn new(
        ctx: &FlowContext<'_>,
        flow: &MeanFlow,
        options: &TurbulenceOptions,
        nu_tilde_far: Real,
    ) -> Self {
        let eq = ScalarEquation::new(
            "nu_tilde",
            ctx.mesh,
            nu_tilde_far,
            options.floor,
            options.normalization,
        );
        let mut model = Self {
            constants: options.sa,
            reconstruction: options.reconstruction,
            eqs: [eq],
            mu_t: vec![0.0; ctx.mesh.n_cells()],
        };
        model.update(ctx, flow);
        debug!(nu_tilde_far, "Spalart-Allmaras initialised");
        model
    }

    pub fn nu_tilde(&self) -> &ScalarEquation {
        &self.eqs[0]
    }

    pub fn nu_tilde_mut(&mut self) -> &mut ScalarEquation {
        &mut self.eqs[0]
    }

    pub fn eddy_viscosity(&self) -> &[Real] {
        &self.mu_t
    }

    pub fn constants(&self) -> &SaConstants {
        &self.constants
    }
}

impl TurbulenceModel for SpalartAllmaras {
    fn name(&self) -> &'static str {
        "SpalartAllmaras"
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
        let eq = &mut self.eqs[0];
        let far = eq.free_stream();
        eq.update(ctx, |patch, f, _| scalar_rule(ctx, flow, patch, f, far, 0.0));

        let rho = flow.density();
        let mu = flow.laminar_viscosity();
        let cv1 = self.constants.cv1;
        for (i, mt) in self.mu_t.iter_mut().enumerate() {
            let nu_tilde = eq.phi[i];
            *mt = rho[i] * nu_tilde * fv1(nu_tilde * rho[i] / mu[i], cv1);
        }
    }

    fn diffusion(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow) {
        let mesh = ctx.mesh;
        let sigma = self.constants.sigma;
        let cb2 = self.constants.cb2;
        let rho = flow.density();
        let mu = flow.laminar_viscosity();
        let nu = |i: usize| mu[i] / rho[i];
        let eq = &mut self.eqs[0];

        let gamma: Vec<Real> = (0..eq.phi.len()).map(|i| (nu(i) + eq.phi[i]) / sigma).collect();
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let gamma_bnd: Vec<Real> = (nif..mesh.n_faces())
            .map(|f| (nu(owner[f]) + eq.bnd[f - nif]) / sigma)
            .collect();
        eq.diffuse(ctx, &gamma, &gamma_bnd);

        let v = mesh.volumes();
        for i in 0..eq.phi.len() {
            let g2 = eq.grad[i].norm_squared();
            eq.add_source(i, v[i], cb2 / sigma * g2, 0.0);
        }
    }

    fn source(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, unsteady: bool) {
        let mesh = ctx.mesh;
        let v = mesh.volumes();
        let d = mesh.wall_distance();
        let rho = flow.density();
        let mu = flow.laminar_viscosity();
        let grad_u = flow.velocity_gradient();
        let c = self.constants;
        let eq = &mut self.eqs[0];

        for i in 0..eq.phi.len() {
            let s = c.source(
                eq.phi[i],
                mu[i] / rho[i],
                d[i],
                vorticity(&grad_u[i]),
                strain_rate(&grad_u[i]),
            );
            eq.add_source(i, v[i], s.production - s.destruction, s.implicit);
        }

        if unsteady {
            self.unsteady(ctx, flow);
        }
    }

    fn eddy(&self) -> EddyView<'_> {
        EddyView::new(&self.mu_t, None)
    }
}
