//! One transported turbulence scalar in kinematic form.
//!
//! A `ScalarEquation` owns the cell values of one scalar (`ν̃`, `k` or `ω`)
//! at the current, previous physical and pseudo-step base levels, plus its
//! rhs and the diagonal source linearisation `lhs`. The closures only fill
//! in coefficients and sources; transport, time integration and residuals
//! live here.
//!
//! The convective flux of a face is the volume flux times an upwinded face
//! value, with a Harten fix scaled by the acoustic spectral radius:
//!
//! ```text
//! F = ½ (φv (φ_L + φ_R) − |φv|_δ (φ_R − φ_L)),   δ = fix · (|φv| + c A)
//! ```

use af_core::{Real, Vec3};
use af_flow::diffusion::corrected_gradient;
use af_flow::roe::harten;
use af_flow::{FlowContext, Limiter, MeanFlow};
use af_mesh::{
    BoundaryRule, Geometry, HaloField, Patch, PatchKind, correct_boundary_conditions,
    face_interpolate, green_gauss,
};
use af_relax::{
    DualTimeSplit, Normalization, ResidualTracker, point_implicit_update, smooth_rhs,
    unsteady_contribution,
};
use tracing::trace;

use crate::error::{TurbulenceError, TurbulenceResult};

/// Storage and operators of one turbulence scalar.
#[derive(Clone, Debug)]
pub struct ScalarEquation {
    name: &'static str,
    floor: Real,
    far: Real,

    pub(crate) phi: Vec<Real>,
    pub(crate) phi_o: Vec<Real>,
    pub(crate) phi_b: Vec<Real>,

    pub(crate) bnd: Vec<Real>,
    pub(crate) halo: HaloField<Real>,
    pub(crate) grad: Vec<Vec3>,

    pub(crate) rhs: Vec<Real>,
    pub(crate) lhs: Vec<Real>,
    pub(crate) body: Vec<Real>,

    dts: DualTimeSplit<Real>,
    residual: ResidualTracker,
}

impl ScalarEquation {
    /// Uniform field at the free-stream value.
    pub fn new(
        name: &'static str,
        mesh: &dyn Geometry,
        far: Real,
        floor: Real,
        normalization: Normalization,
    ) -> Self {
        let n = mesh.n_cells();
        let far = far.max(floor);
        let phi = vec![far; n];
        Self {
            name,
            floor,
            far,
            phi_o: phi.clone(),
            phi_b: phi.clone(),
            bnd: vec![far; mesh.n_boundary_faces()],
            halo: HaloField::local(mesh, &phi),
            grad: vec![Vec3::zeros(); n],
            phi,
            rhs: vec![0.0; n],
            lhs: vec![0.0; n],
            body: vec![0.0; n],
            dts: DualTimeSplit::new(),
            residual: ResidualTracker::new(normalization),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn values(&self) -> &[Real] {
        &self.phi
    }

    /// Overwrite the cell values; each is floored.
    pub fn set_values(&mut self, values: &[Real]) -> TurbulenceResult<()> {
        if values.len() != self.phi.len() {
            return Err(TurbulenceError::InvalidArg {
                what: "scalar field length differs from the cell count",
            });
        }
        for (p, &v) in self.phi.iter_mut().zip(values) {
            *p = if v >= self.floor { v } else { self.floor };
        }
        Ok(())
    }

    pub fn boundary_values(&self) -> &[Real] {
        &self.bnd
    }

    pub fn gradient(&self) -> &[Vec3] {
        &self.grad
    }

    pub fn rhs(&self) -> &[Real] {
        &self.rhs
    }

    pub fn lhs(&self) -> &[Real] {
        &self.lhs
    }

    pub fn floor(&self) -> Real {
        self.floor
    }

    pub fn free_stream(&self) -> Real {
        self.far
    }

    pub fn residual_tracker(&self) -> &ResidualTracker {
        &self.residual
    }

    /// Refresh the halo, boundary face values and the gradient.
    pub fn update<F>(&mut self, ctx: &FlowContext<'_>, rule: F)
    where
        F: FnMut(&Patch, usize, Real) -> BoundaryRule<Real>,
    {
        let mesh = ctx.mesh;
        self.halo = HaloField::exchange(mesh, ctx.comm, &self.phi);
        self.bnd = correct_boundary_conditions(mesh, &self.phi, &self.halo, rule);
        self.grad = green_gauss(mesh, &self.phi, &self.bnd);
    }

    pub fn reset_rhs(&mut self) {
        self.rhs.fill(0.0);
        self.lhs.fill(0.0);
    }

    /// Add the upwinded convective flux of every face to rhs.
    ///
    /// `phi_vol` is the mean-flow volume flux and `wave` the acoustic
    /// spectral radius `|φv| + c A` of each face.
    pub fn advect(
        &mut self,
        ctx: &FlowContext<'_>,
        phi_vol: &[Real],
        wave: &[Real],
        fix: Real,
        limiter: Option<Limiter>,
    ) {
        let mesh = ctx.mesh;
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let neighbour = mesh.neighbour();
        let far_owner = mesh.far_owner();
        let far_neighbour = mesh.far_neighbour();

        let flux = |f: usize, left: Real, right: Real| {
            let a = harten(phi_vol[f], fix * wave[f]);
            0.5 * (phi_vol[f] * (left + right) - a * (right - left))
        };

        for f in 0..nif {
            let (l, r) = (owner[f], neighbour[f]);
            let (left, right) = self.reconstruct(
                limiter,
                far_owner[f].map(|c| self.phi[c]),
                self.phi[l],
                self.phi[r],
                far_neighbour[f].map(|c| self.phi[c]),
            );
            let fl = flux(f, left, right);
            self.rhs[l] += fl;
            self.rhs[r] -= fl;
        }

        for patch in mesh.patches() {
            if patch.kind == PatchKind::Empty {
                continue;
            }
            for f in patch.faces() {
                let b = f - nif;
                let l = owner[f];
                let (left, right) = if patch.kind.is_coupled() {
                    self.reconstruct(
                        limiter,
                        far_owner[f].map(|c| self.phi[c]),
                        self.phi[l],
                        self.halo.near(b),
                        Some(self.halo.far(b)),
                    )
                } else {
                    (self.phi[l], self.bnd[b])
                };
                self.rhs[l] += flux(f, left, right);
            }
        }
        trace!(scalar = self.name, "scalar advection assembled");
    }

    fn reconstruct(
        &self,
        limiter: Option<Limiter>,
        ll: Option<Real>,
        l: Real,
        r: Real,
        rr: Option<Real>,
    ) -> (Real, Real) {
        let Some(lim) = limiter else {
            return (l, r);
        };
        let left = ll.map_or(l, |ll| lim.left(ll, l, r));
        let right = rr.map_or(r, |rr| lim.right(l, r, rr));
        // A limited scalar never leaves the cell range, but guard the floor anyway.
        (
            if left >= self.floor { left } else { l },
            if right >= self.floor { right } else { r },
        )
    }

    /// Add the diffusive flux `−Γ ∇φ·S` of every face to rhs.
    ///
    /// `gamma` holds the cell diffusivities and `gamma_bnd` the boundary
    /// face ones. Symmetry and empty faces carry no diffusive flux.
    pub fn diffuse(&mut self, ctx: &FlowContext<'_>, gamma: &[Real], gamma_bnd: &[Real]) {
        let mesh = ctx.mesh;
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let neighbour = mesh.neighbour();
        let w = mesh.weights();
        let sf = mesh.area_vectors();

        for f in 0..nif {
            let (l, r) = (owner[f], neighbour[f]);
            let mean = face_interpolate(w[f], self.grad[l], self.grad[r]);
            let g = corrected_gradient::<Real>(mean, self.phi[l], self.phi[r], &mesh.delta(f));
            let gf = face_interpolate(w[f], gamma[l], gamma[r]);
            let fl = -gf * g.dot(&sf[f]);
            self.rhs[l] += fl;
            self.rhs[r] -= fl;
        }

        for patch in mesh.patches() {
            if matches!(patch.kind, PatchKind::Empty | PatchKind::Symmetry) {
                continue;
            }
            for f in patch.faces() {
                let b = f - nif;
                let l = owner[f];
                let across = if patch.kind.is_coupled() {
                    self.halo.near(b)
                } else {
                    self.bnd[b]
                };
                let g = corrected_gradient::<Real>(self.grad[l], self.phi[l], across, &mesh.delta(f));
                self.rhs[l] -= gamma_bnd[b] * g.dot(&sf[f]);
            }
        }
    }

    /// Subtract the volumetric source `s` [1/s · φ] of cell `i` and add `implicit` to lhs.
    #[inline]
    pub fn add_source(&mut self, i: usize, volume: Real, s: Real, implicit: Real) {
        self.rhs[i] -= s * volume;
        self.lhs[i] += implicit;
    }

    /// Add `V φ/Δt − Vⁿ φⁿ/Δt`.
    pub fn unsteady(&mut self, ctx: &FlowContext<'_>, dt: Real) {
        let v = ctx.mesh.volumes();
        let v_old = ctx.mesh.volumes_old();
        for i in 0..self.phi.len() {
            self.rhs[i] += unsteady_contribution(v[i], self.phi[i], v_old[i], self.phi_o[i], dt);
        }
    }

    pub fn build_dts(&mut self, ctx: &FlowContext<'_>, half: u8, dt: Real) -> TurbulenceResult<()> {
        match half {
            1 => self.dts.capture_baseline(ctx.mesh.volumes_old(), &self.phi_o, dt)?,
            2 => self
                .dts
                .combine_with_unsteady_term(ctx.mesh.volumes(), &self.phi, &mut self.rhs),
            _ => {
                return Err(TurbulenceError::InvalidArg {
                    what: "dual-time half must be 1 or 2",
                });
            }
        }
        Ok(())
    }

    pub fn reset_dts(&mut self) {
        self.dts.reset();
    }

    /// Subtract the injected body source integrated over the cell.
    pub fn apply_body(&mut self, ctx: &FlowContext<'_>, moving: bool) {
        let v = ctx.mesh.volumes();
        let v_old = ctx.mesh.volumes_old();
        for i in 0..self.phi.len() {
            let vol = if moving { 0.5 * (v[i] + v_old[i]) } else { v[i] };
            self.rhs[i] -= self.body[i] * vol;
        }
    }

    pub fn inject_body(&mut self, i: usize, value: Real) {
        self.body[i] += value;
    }

    pub fn reset_body(&mut self) {
        self.body.fill(0.0);
    }

    /// Smooth rhs, take a point-implicit stage from the base and floor the result.
    ///
    /// Returns the number of floored cells.
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &mut self,
        ctx: &FlowContext<'_>,
        dtau: &[Real],
        physical_dt: Option<Real>,
        alpha: Real,
        iterations: usize,
        epsilon: Real,
    ) -> usize {
        let mesh = ctx.mesh;
        smooth_rhs(mesh, &mut self.rhs, iterations, epsilon);
        point_implicit_update(
            &mut self.phi,
            &self.phi_b,
            &self.rhs,
            &self.lhs,
            dtau,
            mesh.volumes(),
            alpha,
            physical_dt,
        );
        let mut clipped = 0;
        for p in self.phi.iter_mut() {
            if !(*p >= self.floor) {
                *p = self.floor;
                clipped += 1;
            }
        }
        clipped
    }

    pub fn begin_pseudo_step(&mut self) {
        self.phi_b.copy_from_slice(&self.phi);
    }

    pub fn store(&mut self) {
        self.phi_o.copy_from_slice(&self.phi);
        self.begin_pseudo_step();
    }

    pub fn record_residual(&mut self, ctx: &FlowContext<'_>) -> Real {
        self.residual.record(&self.rhs, ctx.comm)
    }

    pub fn residual(&self) -> Real {
        self.residual.value()
    }

    pub fn reset_residual(&mut self) {
        self.residual.reset();
    }
}

/// Acoustic spectral radius `|φv| + c_f A` of every face.
pub fn face_wave_speeds(ctx: &FlowContext<'_>, flow: &MeanFlow, phi_vol: &[Real]) -> Vec<Real> {
    let mesh = ctx.mesh;
    let thermo = ctx.thermo;
    let nif = mesh.n_internal_faces();
    let owner = mesh.owner();
    let neighbour = mesh.neighbour();
    let areas = mesh.areas();
    let p = flow.pressure();
    let rho = flow.density();
    let c = |i: usize| thermo.sound_speed(p[i], rho[i]);

    (0..mesh.n_faces())
        .map(|f| {
            let cf = if f < nif {
                0.5 * (c(owner[f]) + c(neighbour[f]))
            } else {
                c(owner[f])
            };
            phi_vol[f].abs() + cf * areas[f]
        })
        .collect()
}

/// Boundary rule shared by every turbulence scalar.
///
/// Walls take `wall`; far-field faces take the free-stream value on inflow
/// and extrapolate on outflow; everything else extrapolates.
pub(crate) fn scalar_rule(
    ctx: &FlowContext<'_>,
    flow: &MeanFlow,
    patch: &Patch,
    face: usize,
    far: Real,
    wall: Real,
) -> BoundaryRule<Real> {
    match patch.kind {
        PatchKind::Wall => BoundaryRule::Fixed(wall),
        PatchKind::FarField => {
            let b = face - ctx.mesh.n_internal_faces();
            let un = flow.boundary_velocity()[b].dot(&ctx.mesh.area_vectors()[face]);
            if un < 0.0 {
                BoundaryRule::Fixed(far)
            } else {
                BoundaryRule::ZeroGradient
            }
        }
        _ => BoundaryRule::ZeroGradient,
    }
}
