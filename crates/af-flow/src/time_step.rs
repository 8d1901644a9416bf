//! Courant numbers and pseudo time steps.
//!
//! Convective and viscous spectral radii are summed over the faces of each
//! cell:
//!
//! ```text
//! Λc = Σ (|uₙ − vₙ| + c) A
//! Λv = Σ max(4/3, γ/Pr) (μ + μt)/ρ · A² / V
//! dt = CFL · V / (Λc + 4 Λv)
//! ```

use af_core::Real;
use af_mesh::{HaloField, PatchKind};
use tracing::debug;

use crate::context::{EddyView, FlowContext};
use crate::navier_stokes::MeanFlow;
use crate::options::{DtBound, Physics, TimeStepping};
use crate::stats::FieldStats;

impl MeanFlow {
    /// Volume flux `U·S − vₙ A` of every face; zero on empty faces.
    pub fn volume_fluxes(&self, ctx: &FlowContext<'_>) -> Vec<Real> {
        let mesh = ctx.mesh;
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let neighbour = mesh.neighbour();
        let w = mesh.weights();
        let sf = mesh.area_vectors();
        let areas = mesh.areas();
        let speeds = mesh.face_speeds();

        let mut phi = vec![0.0; mesh.n_faces()];
        for f in 0..nif {
            let (l, r) = (owner[f], neighbour[f]);
            let u_f = af_mesh::face_interpolate(w[f], self.u[l], self.u[r]);
            phi[f] = u_f.dot(&sf[f]) - speeds[f] * areas[f];
        }
        for patch in mesh.patches() {
            if patch.kind == PatchKind::Empty {
                continue;
            }
            for f in patch.faces() {
                phi[f] = self.u_bnd[f - nif].dot(&sf[f]) - speeds[f] * areas[f];
            }
        }
        phi
    }

    /// Local Courant number `½ Σ|φ| dt / V` from the current time steps.
    pub fn update_co(&mut self, ctx: &FlowContext<'_>) {
        let mesh = ctx.mesh;
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let neighbour = mesh.neighbour();
        let phi = self.volume_fluxes(ctx);

        let mut sum = vec![0.0; mesh.n_cells()];
        for (f, flux) in phi.iter().enumerate() {
            sum[owner[f]] += flux.abs();
            if f < nif {
                sum[neighbour[f]] += flux.abs();
            }
        }
        let v = mesh.volumes();
        for i in 0..self.co.len() {
            self.co[i] = 0.5 * sum[i] * self.dt[i] / v[i];
        }
        self.co_stats = FieldStats::compute(&self.co, ctx.comm);
    }

    /// Convective and viscous spectral radii per cell.
    pub fn spectral_radii(&self, ctx: &FlowContext<'_>, eddy: &EddyView<'_>) -> (Vec<Real>, Vec<Real>) {
        let mesh = ctx.mesh;
        let thermo = ctx.thermo;
        let gamma = thermo.gamma();
        let visc = (4.0 / 3.0_f64).max(gamma / thermo.prandtl());
        let viscous = self.options.physics == Physics::NavierStokes;
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let neighbour = mesh.neighbour();
        let areas = mesh.areas();
        let speeds = mesh.face_speeds();
        let v = mesh.volumes();

        let n = mesh.n_cells();
        let c: Vec<Real> = (0..n)
            .map(|i| thermo.sound_speed(self.p[i], self.rho[i]))
            .collect();
        let nu = |i: usize| (self.mu[i] + eddy.mu_t(i)) / self.rho[i];

        let mut conv = vec![0.0; n];
        let mut diff = vec![0.0; n];
        for f in 0..nif {
            let (l, r) = (owner[f], neighbour[f]);
            let nf = mesh.unit_normal(f);
            let un = (0.5 * (self.u[l] + self.u[r]).dot(&nf) - speeds[f]).abs();
            let lam = (un + 0.5 * (c[l] + c[r])) * areas[f];
            conv[l] += lam;
            conv[r] += lam;
            if viscous {
                let a2 = areas[f] * areas[f];
                diff[l] += visc * nu(l) * a2 / v[l];
                diff[r] += visc * nu(r) * a2 / v[r];
            }
        }
        for patch in mesh.patches() {
            if patch.kind == PatchKind::Empty {
                continue;
            }
            for f in patch.faces() {
                let l = owner[f];
                let un = (self.u[l].dot(&mesh.unit_normal(f)) - speeds[f]).abs();
                conv[l] += (un + c[l]) * areas[f];
                if viscous {
                    diff[l] += visc * nu(l) * areas[f] * areas[f] / v[l];
                }
            }
        }
        (conv, diff)
    }

    /// Pseudo time step per cell from the spectral radii.
    ///
    /// Global stepping gives every cell the domain minimum; local stepping
    /// is then bounded per `bound`.
    pub fn update_dt(
        &mut self,
        ctx: &FlowContext<'_>,
        eddy: &EddyView<'_>,
        stepping: TimeStepping,
        cfl: Real,
        bound: DtBound,
    ) {
        let mesh = ctx.mesh;
        let comm = ctx.comm;
        let (conv, diff) = self.spectral_radii(ctx, eddy);
        let v = mesh.volumes();
        for i in 0..self.dt.len() {
            let lam = conv[i] + 4.0 * diff[i];
            self.dt[i] = if lam > 0.0 { cfl * v[i] / lam } else { Real::INFINITY };
        }

        let local_min = self.dt.iter().copied().fold(Real::INFINITY, Real::min);
        let global_min = comm.min(local_min);

        match stepping {
            TimeStepping::Global => self.dt.fill(global_min),
            TimeStepping::Local => match bound {
                DtBound::None => {}
                DtBound::Global { ratio } => {
                    let cap = ratio * global_min;
                    for dt in self.dt.iter_mut() {
                        *dt = dt.min(cap);
                    }
                }
                DtBound::Local { ratio } => self.bound_locally(ctx, ratio),
            },
        }

        self.dt_stats = FieldStats::compute(&self.dt, comm);
        debug!(
            min = self.dt_stats.min,
            max = self.dt_stats.max,
            cfl,
            "pseudo time step updated"
        );
    }

    fn bound_locally(&mut self, ctx: &FlowContext<'_>, ratio: Real) {
        let mesh = ctx.mesh;
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let raw = self.dt.clone();
        let halo = HaloField::exchange(mesh, ctx.comm, &raw);

        let mut local_min = raw.clone();
        for (i, m) in local_min.iter_mut().enumerate() {
            for &j in mesh.cell_neighbours(i) {
                *m = m.min(raw[j]);
            }
        }
        for patch in mesh.patches() {
            if !patch.kind.is_coupled() {
                continue;
            }
            for f in patch.faces() {
                let l = owner[f];
                local_min[l] = local_min[l].min(halo.near(f - nif));
            }
        }
        for (dt, m) in self.dt.iter_mut().zip(&local_min) {
            *dt = dt.min(ratio * m);
        }
    }

    pub fn courant(&self) -> &[Real] {
        &self.co
    }

    pub fn courant_stats(&self) -> FieldStats {
        self.co_stats
    }

    pub fn dt_stats(&self) -> FieldStats {
        self.dt_stats
    }
}
