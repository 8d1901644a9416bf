//! Mean-flow equations: density, momentum and total energy.
//!
//! `rhs` arrays hold volume-integrated residuals with the outflow-positive
//! sign convention: a face flux is added to the owner and subtracted from the
//! neighbour, and sources are subtracted. The pseudo-time update is then
//! `U = U₀ − α dτ χ R / V`.
//!
//! One pseudo-iteration is driven from outside as
//!
//! ```text
//! begin_pseudo_step → [reset_rhs → advection → diffusion → source/body
//!                      → solve → update] per stage
//! ```
//!
//! with `store` and `build_dts` bracketing each physical step of an
//! unsteady run.

use af_core::{Real, Tensor, Vec3};
use af_mesh::{HaloField, PatchKind, correct_boundary_conditions, green_gauss};
use af_relax::residual::NO_RESIDUAL;
use af_relax::{
    DualTimeSplit, ResidualTracker, explicit_update, smooth_rhs, unsteady_contribution,
};
use af_thermo::{Conservative, Primitive};
use tracing::{debug, trace};

use crate::boundary;
use crate::context::FlowContext;
use crate::error::{FlowError, FlowResult};
use crate::limiter::Limiter;
use crate::options::{FlowOptions, Reconstruction};
use crate::roe::{FaceState, Flux, roe_flux};
use crate::stats::FieldStats;

/// Mean-flow state and its residual bookkeeping on one partition.
#[derive(Clone, Debug)]
pub struct MeanFlow {
    pub(crate) options: FlowOptions,

    pub(crate) far_field: Conservative,
    pub(crate) far_prim: Primitive,

    // Conservative state
    pub(crate) rho: Vec<Real>,
    pub(crate) m: Vec<Vec3>,
    pub(crate) et: Vec<Real>,

    // Previous physical time level
    pub(crate) rho_o: Vec<Real>,
    pub(crate) m_o: Vec<Vec3>,
    pub(crate) et_o: Vec<Real>,

    // Base of the current pseudo-step
    pub(crate) rho_b: Vec<Real>,
    pub(crate) m_b: Vec<Vec3>,
    pub(crate) et_b: Vec<Real>,

    // Derived by `update`
    pub(crate) p: Vec<Real>,
    pub(crate) u: Vec<Vec3>,
    pub(crate) t: Vec<Real>,
    pub(crate) mu: Vec<Real>,
    pub(crate) u_bnd: Vec<Vec3>,
    pub(crate) t_bnd: Vec<Real>,
    pub(crate) u_halo: HaloField<Vec3>,
    pub(crate) t_halo: HaloField<Real>,
    pub(crate) grad_u: Vec<Tensor>,
    pub(crate) grad_t: Vec<Vec3>,

    pub(crate) rhs_rho: Vec<Real>,
    pub(crate) rhs_m: Vec<Vec3>,
    pub(crate) rhs_et: Vec<Real>,

    // Injected sources per unit volume
    pub(crate) body_rho: Vec<Real>,
    pub(crate) body_m: Vec<Vec3>,
    pub(crate) body_et: Vec<Real>,

    pub(crate) dt: Vec<Real>,
    pub(crate) co: Vec<Real>,
    pub(crate) dt_stats: FieldStats,
    pub(crate) co_stats: FieldStats,

    pub(crate) physical_dt: Option<Real>,
    pub(crate) dts_rho: DualTimeSplit<Real>,
    pub(crate) dts_m: DualTimeSplit<Vec3>,
    pub(crate) dts_et: DualTimeSplit<Real>,

    pub(crate) residuals: [ResidualTracker; 3],
}

impl MeanFlow {
    /// Initialise from one primitive state per cell.
    pub fn new(
        ctx: &FlowContext<'_>,
        options: FlowOptions,
        initial: &[Primitive],
        far_field: Primitive,
    ) -> FlowResult<Self> {
        options.validate()?;
        let n = ctx.mesh.n_cells();
        if initial.len() != n {
            return Err(FlowError::LengthMismatch {
                what: "initial state",
                expected: n,
                actual: initial.len(),
            });
        }
        for prim in initial.iter().chain(std::iter::once(&far_field)) {
            check_state(prim)?;
        }

        let thermo = ctx.thermo;
        let far_cons = thermo.conservative(&far_field);
        let far_prim = thermo.primitive(&far_cons);
        let cons: Vec<Conservative> = initial.iter().map(|p| thermo.conservative(p)).collect();
        let rho: Vec<Real> = cons.iter().map(|c| c.rho).collect();
        let m: Vec<Vec3> = cons.iter().map(|c| c.m).collect();
        let et: Vec<Real> = cons.iter().map(|c| c.et).collect();
        let nb = ctx.mesh.n_boundary_faces();

        let mut flow = Self {
            options,
            far_field: far_cons,
            far_prim,
            rho_o: rho.clone(),
            m_o: m.clone(),
            et_o: et.clone(),
            rho_b: rho.clone(),
            m_b: m.clone(),
            et_b: et.clone(),
            rho,
            m,
            et,
            p: vec![0.0; n],
            u: vec![Vec3::zeros(); n],
            t: vec![0.0; n],
            mu: vec![0.0; n],
            u_bnd: vec![Vec3::zeros(); nb],
            t_bnd: vec![0.0; nb],
            u_halo: HaloField::local(ctx.mesh, &vec![Vec3::zeros(); n]),
            t_halo: HaloField::local(ctx.mesh, &vec![0.0; n]),
            grad_u: vec![Tensor::zeros(); n],
            grad_t: vec![Vec3::zeros(); n],
            rhs_rho: vec![0.0; n],
            rhs_m: vec![Vec3::zeros(); n],
            rhs_et: vec![0.0; n],
            body_rho: vec![0.0; n],
            body_m: vec![Vec3::zeros(); n],
            body_et: vec![0.0; n],
            dt: vec![0.0; n],
            co: vec![0.0; n],
            dt_stats: FieldStats::default(),
            co_stats: FieldStats::default(),
            physical_dt: None,
            dts_rho: DualTimeSplit::new(),
            dts_m: DualTimeSplit::new(),
            dts_et: DualTimeSplit::new(),
            residuals: std::array::from_fn(|_| ResidualTracker::new(options.normalization)),
        };
        flow.update(ctx);
        debug!(cells = n, gas = thermo.name(), "mean flow initialised");
        Ok(flow)
    }

    /// Uniform initial field equal to the far-field state.
    pub fn uniform(ctx: &FlowContext<'_>, options: FlowOptions, state: Primitive) -> FlowResult<Self> {
        let initial = vec![state; ctx.mesh.n_cells()];
        Self::new(ctx, options, &initial, state)
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    pub fn n_cells(&self) -> usize {
        self.rho.len()
    }

    // ------------------------------------------------------------------
    // Derived quantities
    // ------------------------------------------------------------------

    /// Recompute primitives, viscosity, boundary values and gradients from
    /// the conservative state.
    pub fn update(&mut self, ctx: &FlowContext<'_>) {
        let mesh = ctx.mesh;
        let thermo = ctx.thermo;
        for i in 0..self.rho.len() {
            let prim = thermo.primitive(&Conservative::new(self.rho[i], self.m[i], self.et[i]));
            self.p[i] = prim.p;
            self.u[i] = prim.u;
            self.t[i] = prim.t;
            self.mu[i] = thermo.viscosity(prim.t);
        }

        self.u_halo = HaloField::exchange(mesh, ctx.comm, &self.u);
        self.t_halo = HaloField::exchange(mesh, ctx.comm, &self.t);

        let physics = self.options.physics;
        let far_u = self.far_prim.u;
        let far_t = self.far_prim.t;
        let nif = mesh.n_internal_faces();
        let speeds = mesh.face_speeds();
        let transpiration = mesh.transpiration();
        self.u_bnd = correct_boundary_conditions(mesh, &self.u, &self.u_halo, |patch, f, inside| {
            boundary::velocity_rule(
                patch,
                physics,
                inside,
                mesh.unit_normal(f),
                speeds[f],
                transpiration[f - nif],
                far_u,
            )
        });
        self.t_bnd = correct_boundary_conditions(mesh, &self.t, &self.t_halo, |patch, _, _| {
            boundary::temperature_rule(patch, far_t)
        });

        self.grad_u = green_gauss(mesh, &self.u, &self.u_bnd);
        self.grad_t = green_gauss(mesh, &self.t, &self.t_bnd);
    }

    // ------------------------------------------------------------------
    // Residual assembly
    // ------------------------------------------------------------------

    pub fn reset_rhs(&mut self) {
        self.rhs_rho.fill(0.0);
        self.rhs_m.fill(Vec3::zeros());
        self.rhs_et.fill(0.0);
    }

    /// Convective flux of every face, area included, oriented owner → neighbour.
    ///
    /// Empty faces carry a zero flux. Halo values of coupled patches are
    /// exchanged once at the start and treated as immutable. A cyclic pair is
    /// evaluated once, from the patch listed first, and its partner face gets
    /// the negated flux.
    pub fn convective_fluxes(&self, ctx: &FlowContext<'_>) -> Vec<Flux> {
        let mesh = ctx.mesh;
        let comm = ctx.comm;
        let gamma = ctx.thermo.gamma();
        let fix = self.options.entropy_fix;
        let roe_average = self.options.roe_average;
        let limiter = match self.options.reconstruction {
            Reconstruction::FirstOrder => None,
            Reconstruction::Muscl(lim) => Some(lim),
        };

        let rho_halo = HaloField::exchange(mesh, comm, &self.rho);
        let u_halo = HaloField::exchange(mesh, comm, &self.u);
        let p_halo = HaloField::exchange(mesh, comm, &self.p);

        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let neighbour = mesh.neighbour();
        let far_owner = mesh.far_owner();
        let far_neighbour = mesh.far_neighbour();
        let areas = mesh.areas();
        let speeds = mesh.face_speeds();
        let transpiration = mesh.transpiration();

        let mut fluxes = vec![Flux::zero(); mesh.n_faces()];

        for f in 0..nif {
            let (l, r) = (owner[f], neighbour[f]);
            let ll = far_owner[f];
            let rr = far_neighbour[f];
            let cell = |c: usize| (self.rho[c], self.u[c], self.p[c]);
            let (left, right) = reconstruct_pair(
                limiter,
                ll.map(cell),
                cell(l),
                cell(r),
                rr.map(cell),
                gamma,
            );
            let n = mesh.unit_normal(f);
            fluxes[f] = roe_flux(&left, &right, &n, speeds[f], gamma, fix, roe_average) * areas[f];
        }

        let far = FaceState::new(self.far_field.rho, self.far_prim.u, self.far_prim.p, gamma);
        let patches = mesh.patches();
        for (pi, patch) in patches.iter().enumerate() {
            let partner_start = match patch.kind {
                PatchKind::Cyclic { partner } if partner.idx() < pi => continue,
                PatchKind::Cyclic { partner } => Some(patches[partner.idx()].faces().start),
                _ => None,
            };
            for f in patch.faces() {
                let b = f - nif;
                let l = owner[f];
                let n = mesh.unit_normal(f);
                let vn = speeds[f];
                let inside = FaceState::new(self.rho[l], self.u[l], self.p[l], gamma);
                let flux = match patch.kind {
                    PatchKind::Empty => continue,
                    PatchKind::Wall => boundary::wall_flux(
                        self.rho[l],
                        self.m[l],
                        self.et[l],
                        self.p[l],
                        &n,
                        vn,
                        transpiration[b],
                    ),
                    PatchKind::Symmetry => {
                        boundary::wall_flux(self.rho[l], self.m[l], self.et[l], self.p[l], &n, vn, 0.0)
                    }
                    PatchKind::FarField => {
                        roe_flux(&inside, &far, &n, vn, gamma, fix, roe_average)
                    }
                    PatchKind::Extrapolated => inside.flux(&n, vn),
                    PatchKind::Cyclic { .. } | PatchKind::Processor { .. } => {
                        let cell = |c: usize| (self.rho[c], self.u[c], self.p[c]);
                        let near = (rho_halo.near(b), u_halo.near(b), p_halo.near(b));
                        let behind = (rho_halo.far(b), u_halo.far(b), p_halo.far(b));
                        let (left, right) = reconstruct_pair(
                            limiter,
                            far_owner[f].map(cell),
                            cell(l),
                            near,
                            Some(behind),
                            gamma,
                        );
                        roe_flux(&left, &right, &n, vn, gamma, fix, roe_average)
                    }
                };
                fluxes[f] = flux * areas[f];
                if let Some(start) = partner_start {
                    fluxes[start + f - patch.faces().start] = fluxes[f] * -1.0;
                }
            }
        }
        fluxes
    }

    /// Add the convective fluxes to rhs.
    pub fn advection(&mut self, ctx: &FlowContext<'_>) {
        let fluxes = self.convective_fluxes(ctx);
        self.scatter(ctx, &fluxes);
        trace!("mean-flow advection assembled");
    }

    /// Add `flux` of every face to its owner and subtract it from its neighbour.
    pub(crate) fn scatter(&mut self, ctx: &FlowContext<'_>, fluxes: &[Flux]) {
        let mesh = ctx.mesh;
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let neighbour = mesh.neighbour();
        for (f, flux) in fluxes.iter().enumerate() {
            let l = owner[f];
            self.rhs_rho[l] += flux.rho;
            self.rhs_m[l] += flux.m;
            self.rhs_et[l] += flux.et;
            if f < nif {
                let r = neighbour[f];
                self.rhs_rho[r] -= flux.rho;
                self.rhs_m[r] -= flux.m;
                self.rhs_et[r] -= flux.et;
            }
        }
    }

    /// Add the unsteady dual-time term `V U/Δt − Vⁿ Uⁿ/Δt`.
    ///
    /// The mean flow has no other volumetric source, so without `unsteady`
    /// (or outside an unsteady run) this does nothing.
    pub fn source(&mut self, ctx: &FlowContext<'_>, unsteady: bool) {
        let Some(dt) = self.physical_dt.filter(|_| unsteady) else {
            return;
        };
        let v = ctx.mesh.volumes();
        let v_old = ctx.mesh.volumes_old();
        for i in 0..self.rho.len() {
            self.rhs_rho[i] += unsteady_contribution(v[i], self.rho[i], v_old[i], self.rho_o[i], dt);
            self.rhs_m[i] += unsteady_contribution(v[i], self.m[i], v_old[i], self.m_o[i], dt);
            self.rhs_et[i] += unsteady_contribution(v[i], self.et[i], v_old[i], self.et_o[i], dt);
        }
    }

    /// Subtract the injected body sources, integrated over the cell.
    ///
    /// In unsteady mode on a moving mesh the sources are integrated over the
    /// mean of the current and previous cell volumes.
    pub fn body(&mut self, ctx: &FlowContext<'_>, unsteady: bool) {
        let v = ctx.mesh.volumes();
        let v_old = ctx.mesh.volumes_old();
        let moving = unsteady && self.physical_dt.is_some() && ctx.mesh.has_moved();
        for i in 0..self.rho.len() {
            let vol = if moving { 0.5 * (v[i] + v_old[i]) } else { v[i] };
            self.rhs_rho[i] -= self.body_rho[i] * vol;
            self.rhs_m[i] -= self.body_m[i] * vol;
            self.rhs_et[i] -= self.body_et[i] * vol;
        }
    }

    /// Add a source per unit volume to cell `i`.
    pub fn inject_body(&mut self, i: usize, mass: Real, momentum: Vec3, energy: Real) {
        self.body_rho[i] += mass;
        self.body_m[i] += momentum;
        self.body_et[i] += energy;
    }

    /// Add a uniform acceleration `g` (force `ρg`, work `m·g`).
    pub fn inject_acceleration(&mut self, g: Vec3) {
        for i in 0..self.rho.len() {
            self.body_m[i] += g * self.rho[i];
            self.body_et[i] += self.m[i].dot(&g);
        }
    }

    pub fn reset_body(&mut self) {
        self.body_rho.fill(0.0);
        self.body_m.fill(Vec3::zeros());
        self.body_et.fill(0.0);
    }

    // ------------------------------------------------------------------
    // Time integration
    // ------------------------------------------------------------------

    /// Snapshot the state as base of the next pseudo-step.
    pub fn begin_pseudo_step(&mut self) {
        self.rho_b.copy_from_slice(&self.rho);
        self.m_b.copy_from_slice(&self.m);
        self.et_b.copy_from_slice(&self.et);
    }

    /// Copy the current state into the previous-time-level slot.
    pub fn store(&mut self) {
        self.rho_o.copy_from_slice(&self.rho);
        self.m_o.copy_from_slice(&self.m);
        self.et_o.copy_from_slice(&self.et);
        self.begin_pseudo_step();
    }

    /// Smooth rhs and advance one stage from the pseudo-step base.
    ///
    /// Density is floored afterwards; nothing else is clipped.
    pub fn solve(&mut self, ctx: &FlowContext<'_>, alpha: Real, iterations: usize, epsilon: Real) {
        let mesh = ctx.mesh;
        smooth_rhs(mesh, &mut self.rhs_rho, iterations, epsilon);
        smooth_rhs(mesh, &mut self.rhs_m, iterations, epsilon);
        smooth_rhs(mesh, &mut self.rhs_et, iterations, epsilon);

        let v = mesh.volumes();
        let pdt = self.physical_dt;
        explicit_update(&mut self.rho, &self.rho_b, &self.rhs_rho, &self.dt, v, alpha, pdt);
        explicit_update(&mut self.m, &self.m_b, &self.rhs_m, &self.dt, v, alpha, pdt);
        explicit_update(&mut self.et, &self.et_b, &self.rhs_et, &self.dt, v, alpha, pdt);

        let floor = self.options.density_floor;
        let mut clipped = 0usize;
        for r in self.rho.iter_mut() {
            if !(*r >= floor) {
                *r = floor;
                clipped += 1;
            }
        }
        if clipped > 0 {
            debug!(clipped, floor, "density floored");
        }
    }

    /// Physical time step of an unsteady run; `None` for steady runs.
    pub fn set_physical_dt(&mut self, dt: Option<Real>) -> FlowResult<()> {
        if let Some(v) = dt {
            if !(v.is_finite() && v > 0.0) {
                return Err(FlowError::InvalidArg {
                    what: "physical time step must be positive",
                });
            }
        }
        self.physical_dt = dt;
        self.dts_rho.reset();
        self.dts_m.reset();
        self.dts_et.reset();
        Ok(())
    }

    pub fn physical_dt(&self) -> Option<Real> {
        self.physical_dt
    }

    /// Two-phase dual-time source.
    ///
    /// `half == 1` captures `Vⁿ Uⁿ / Δt` from the stored level; `half == 2`
    /// adds `V U / Δt` minus that baseline. Running both on the same state
    /// gives bit-for-bit the same rhs as `source(ctx, true)`.
    pub fn build_dts(&mut self, ctx: &FlowContext<'_>, half: u8) -> FlowResult<()> {
        let dt = self.physical_dt.ok_or(FlowError::InvalidArg {
            what: "dual time-stepping needs a physical time step",
        })?;
        let mesh = ctx.mesh;
        match half {
            1 => {
                let v_old = mesh.volumes_old();
                self.dts_rho.capture_baseline(v_old, &self.rho_o, dt)?;
                self.dts_m.capture_baseline(v_old, &self.m_o, dt)?;
                self.dts_et.capture_baseline(v_old, &self.et_o, dt)?;
            }
            2 => {
                let v = mesh.volumes();
                self.dts_rho.combine_with_unsteady_term(v, &self.rho, &mut self.rhs_rho);
                self.dts_m.combine_with_unsteady_term(v, &self.m, &mut self.rhs_m);
                self.dts_et.combine_with_unsteady_term(v, &self.et, &mut self.rhs_et);
            }
            _ => {
                return Err(FlowError::InvalidArg {
                    what: "dual-time half must be 1 or 2",
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Residuals
    // ------------------------------------------------------------------

    /// Record the normalised RMS of the three rhs arrays.
    pub fn update_residuals(&mut self, ctx: &FlowContext<'_>) {
        let comm = ctx.comm;
        self.residuals[0].record(&self.rhs_rho, comm);
        self.residuals[1].record(&self.rhs_m, comm);
        self.residuals[2].record(&self.rhs_et, comm);
    }

    /// Largest of the density, momentum and energy residuals; −1 before any is recorded.
    pub fn residual(&self) -> Real {
        self.residuals
            .iter()
            .map(ResidualTracker::value)
            .fold(NO_RESIDUAL, Real::max)
    }

    pub fn residual_trackers(&self) -> &[ResidualTracker; 3] {
        &self.residuals
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn density(&self) -> &[Real] {
        &self.rho
    }

    pub fn momentum(&self) -> &[Vec3] {
        &self.m
    }

    pub fn energy(&self) -> &[Real] {
        &self.et
    }

    pub fn pressure(&self) -> &[Real] {
        &self.p
    }

    pub fn velocity(&self) -> &[Vec3] {
        &self.u
    }

    pub fn temperature(&self) -> &[Real] {
        &self.t
    }

    pub fn laminar_viscosity(&self) -> &[Real] {
        &self.mu
    }

    /// Velocity on boundary faces, indexed by `face − n_internal_faces`.
    pub fn boundary_velocity(&self) -> &[Vec3] {
        &self.u_bnd
    }

    /// Halo velocities of coupled boundary faces.
    pub fn velocity_halo(&self) -> &HaloField<Vec3> {
        &self.u_halo
    }

    pub fn velocity_gradient(&self) -> &[Tensor] {
        &self.grad_u
    }

    pub fn temperature_gradient(&self) -> &[Vec3] {
        &self.grad_t
    }

    pub fn rhs_density(&self) -> &[Real] {
        &self.rhs_rho
    }

    pub fn rhs_momentum(&self) -> &[Vec3] {
        &self.rhs_m
    }

    pub fn rhs_energy(&self) -> &[Real] {
        &self.rhs_et
    }

    /// Pseudo time step per cell.
    pub fn dt(&self) -> &[Real] {
        &self.dt
    }

    pub fn far_field(&self) -> Primitive {
        self.far_prim
    }

    pub fn conservative(&self, i: usize) -> Conservative {
        Conservative::new(self.rho[i], self.m[i], self.et[i])
    }

    /// Overwrite the state of cell `i`; call `update` before the next assembly.
    pub fn set_conservative(&mut self, i: usize, state: Conservative) {
        self.rho[i] = state.rho;
        self.m[i] = state.m;
        self.et[i] = state.et;
    }

    /// Domain integrals of mass, momentum and total energy.
    pub fn totals(&self, ctx: &FlowContext<'_>) -> (Real, Vec3, Real) {
        let v = ctx.mesh.volumes();
        let mut sums = [0.0; 5];
        for i in 0..self.rho.len() {
            sums[0] += self.rho[i] * v[i];
            sums[1] += self.m[i].x * v[i];
            sums[2] += self.m[i].y * v[i];
            sums[3] += self.m[i].z * v[i];
            sums[4] += self.et[i] * v[i];
        }
        ctx.comm.sum_all(&mut sums);
        (sums[0], Vec3::new(sums[1], sums[2], sums[3]), sums[4])
    }
}

fn check_state(prim: &Primitive) -> FlowResult<()> {
    if !(prim.p.is_finite() && prim.p > 0.0) {
        return Err(FlowError::InvalidArg {
            what: "pressure must be positive and finite",
        });
    }
    if !(prim.t.is_finite() && prim.t > 0.0) {
        return Err(FlowError::InvalidArg {
            what: "temperature must be positive and finite",
        });
    }
    if !prim.u.iter().all(|c| c.is_finite()) {
        return Err(FlowError::InvalidArg {
            what: "velocity must be finite",
        });
    }
    Ok(())
}

type CellPrim = (Real, Vec3, Real);

/// Left and right face states of the `LL | L |-> R | RR` stencil.
///
/// A side whose reconstructed density or pressure is not positive falls
/// back to its cell value.
fn reconstruct_pair(
    limiter: Option<Limiter>,
    ll: Option<CellPrim>,
    l: CellPrim,
    r: CellPrim,
    rr: Option<CellPrim>,
    gamma: Real,
) -> (FaceState, FaceState) {
    let first = |(rho, u, p): CellPrim| FaceState::new(rho, u, p, gamma);
    let Some(lim) = limiter else {
        return (first(l), first(r));
    };
    let admissible = |(rho, _, p): CellPrim| rho > 0.0 && p > 0.0;

    let left = match ll {
        Some(ll) => {
            let s = (lim.left(ll.0, l.0, r.0), lim.left(ll.1, l.1, r.1), lim.left(ll.2, l.2, r.2));
            if admissible(s) { s } else { l }
        }
        None => l,
    };
    let right = match rr {
        Some(rr) => {
            let s = (lim.right(l.0, r.0, rr.0), lim.right(l.1, r.1, rr.1), lim.right(l.2, r.2, rr.2));
            if admissible(s) { s } else { r }
        }
        None => r,
    };
    (first(left), first(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_mesh::{CartesianSpec, Geometry, Mesh, PatchKind, SerialComm};
    use af_thermo::PerfectGas;

    fn box_mesh(kind: PatchKind) -> Mesh {
        let spec = CartesianSpec::new([4, 3, 1], Vec3::new(4.0, 3.0, 1.0)).with_kinds([
            kind,
            kind,
            kind,
            kind,
            PatchKind::Empty,
            PatchKind::Empty,
        ]);
        Mesh::cartesian(&spec).unwrap()
    }

    fn air_state() -> Primitive {
        Primitive::new(1.0e5, Vec3::new(30.0, 0.0, 0.0), 300.0)
    }

    #[test]
    fn rejects_bad_initial_state() {
        let mesh = box_mesh(PatchKind::Wall);
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut bad = vec![air_state(); mesh.n_cells()];
        bad[2].p = -1.0;
        assert!(MeanFlow::new(&ctx, FlowOptions::default(), &bad, air_state()).is_err());
        let short = vec![air_state(); 3];
        assert!(matches!(
            MeanFlow::new(&ctx, FlowOptions::default(), &short, air_state()),
            Err(FlowError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn residual_is_sentinel_before_recording() {
        let mesh = box_mesh(PatchKind::FarField);
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let flow = MeanFlow::uniform(&ctx, FlowOptions::default(), air_state()).unwrap();
        assert_eq!(flow.residual(), -1.0);
    }

    #[test]
    fn uniform_state_in_far_field_box_has_zero_rhs() {
        let mesh = box_mesh(PatchKind::FarField);
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), air_state()).unwrap();
        flow.reset_rhs();
        flow.advection(&ctx);
        flow.diffusion(&ctx, &crate::EddyView::none());
        assert!(flow.rhs_density().iter().all(|&r| r == 0.0));
        assert!(flow.rhs_momentum().iter().all(|r| *r == Vec3::zeros()));
        assert!(flow.rhs_energy().iter().all(|&r| r == 0.0));
    }

    #[test]
    fn build_dts_matches_direct_source_bitwise() {
        let mesh = box_mesh(PatchKind::Wall);
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), air_state()).unwrap();
        flow.set_physical_dt(Some(1e-3)).unwrap();
        flow.store();
        for i in 0..flow.n_cells() {
            let mut c = flow.conservative(i);
            c.rho *= 1.0 + 0.01 * i as f64;
            c.et *= 1.0 - 0.003 * i as f64;
            flow.set_conservative(i, c);
        }
        flow.update(&ctx);

        flow.reset_rhs();
        flow.advection(&ctx);
        let mut direct = flow.clone();
        direct.source(&ctx, true);

        flow.build_dts(&ctx, 1).unwrap();
        flow.build_dts(&ctx, 2).unwrap();
        assert_eq!(flow.rhs_density(), direct.rhs_density());
        assert_eq!(flow.rhs_momentum(), direct.rhs_momentum());
        assert_eq!(flow.rhs_energy(), direct.rhs_energy());
    }

    #[test]
    fn build_dts_requires_physical_step() {
        let mesh = box_mesh(PatchKind::Wall);
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), air_state()).unwrap();
        assert!(flow.build_dts(&ctx, 1).is_err());
        flow.set_physical_dt(Some(0.1)).unwrap();
        assert!(flow.build_dts(&ctx, 3).is_err());
        assert!(flow.set_physical_dt(Some(-1.0)).is_err());
    }

    #[test]
    fn steady_source_is_noop() {
        let mesh = box_mesh(PatchKind::Wall);
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), air_state()).unwrap();
        flow.reset_rhs();
        flow.source(&ctx, true);
        flow.source(&ctx, false);
        assert!(flow.rhs_density().iter().all(|&r| r == 0.0));
    }

    #[test]
    fn solve_floors_density() {
        let mesh = box_mesh(PatchKind::Wall);
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), air_state()).unwrap();
        flow.dt.fill(1.0);
        flow.reset_rhs();
        flow.rhs_rho.fill(1.0e6);
        flow.solve(&ctx, 1.0, 0, 0.0);
        assert!(flow.density().iter().all(|&r| r == flow.options.density_floor));
    }

    #[test]
    fn body_force_enters_with_negative_sign() {
        let mesh = box_mesh(PatchKind::Wall);
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), air_state()).unwrap();
        flow.reset_rhs();
        flow.inject_body(0, 0.0, Vec3::new(2.0, 0.0, 0.0), 0.0);
        flow.body(&ctx, false);
        assert_eq!(flow.rhs_momentum()[0], Vec3::new(-2.0, 0.0, 0.0));
        flow.reset_body();
        flow.reset_rhs();
        flow.body(&ctx, false);
        assert_eq!(flow.rhs_momentum()[0], Vec3::zeros());
    }
}
