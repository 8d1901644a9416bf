//! Capability interface of a turbulence closure.

use af_core::Real;
use af_flow::{EddyView, FlowContext, Limiter, MeanFlow, Reconstruction};
use af_relax::residual::NO_RESIDUAL;
use tracing::debug;

use crate::error::{TurbulenceError, TurbulenceResult};
use crate::scalar::{ScalarEquation, face_wave_speeds};

/// Operations every closure supports.
///
/// Closures only provide their equations, coefficients and sources; the
/// transport, time-integration and residual operations have default
/// implementations over [`ScalarEquation`].
pub trait TurbulenceModel {
    fn name(&self) -> &'static str;

    fn equations(&self) -> &[ScalarEquation];

    fn equations_mut(&mut self) -> &mut [ScalarEquation];

    /// Entropy fix of the scalar upwind flux.
    fn entropy_fix(&self) -> Real;

    fn reconstruction(&self) -> Reconstruction;

    /// Refresh boundary values, gradients and the eddy viscosity.
    fn update(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow);

    fn diffusion(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow);

    /// Production and destruction, plus the unsteady term when `unsteady`.
    fn source(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, unsteady: bool);

    /// What the mean flow sees of this closure.
    fn eddy(&self) -> EddyView<'_>;

    fn advection(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow) {
        let phi_vol = flow.volume_fluxes(ctx);
        let wave = face_wave_speeds(ctx, flow, &phi_vol);
        let fix = self.entropy_fix();
        let limiter: Option<Limiter> = match self.reconstruction() {
            Reconstruction::FirstOrder => None,
            Reconstruction::Muscl(lim) => Some(lim),
        };
        for eq in self.equations_mut() {
            eq.advect(ctx, &phi_vol, &wave, fix, limiter);
        }
    }

    /// Add the dual-time term of every equation when running unsteady.
    fn unsteady(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow) {
        if let Some(dt) = flow.physical_dt() {
            for eq in self.equations_mut() {
                eq.unsteady(ctx, dt);
            }
        }
    }

    fn body(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, unsteady: bool) {
        let moving = unsteady && flow.physical_dt().is_some() && ctx.mesh.has_moved();
        for eq in self.equations_mut() {
            eq.apply_body(ctx, moving);
        }
    }

    /// Advance every equation one stage with the mean-flow pseudo time step.
    fn solve(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, alpha: Real, iterations: usize, epsilon: Real) {
        let name = self.name();
        let dtau = flow.dt();
        let physical_dt = flow.physical_dt();
        for eq in self.equations_mut() {
            let clipped = eq.solve(ctx, dtau, physical_dt, alpha, iterations, epsilon);
            if clipped > 0 {
                debug!(model = name, scalar = eq.name(), clipped, "turbulence scalar floored");
            }
        }
    }

    fn build_dts(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, half: u8) -> TurbulenceResult<()> {
        let Some(dt) = flow.physical_dt() else {
            return Err(TurbulenceError::InvalidArg {
                what: "dual time-stepping needs a physical time step",
            });
        };
        for eq in self.equations_mut() {
            eq.build_dts(ctx, half, dt)?;
        }
        Ok(())
    }

    fn reset_rhs(&mut self) {
        for eq in self.equations_mut() {
            eq.reset_rhs();
        }
    }

    fn reset_body(&mut self) {
        for eq in self.equations_mut() {
            eq.reset_body();
        }
    }

    fn begin_pseudo_step(&mut self) {
        for eq in self.equations_mut() {
            eq.begin_pseudo_step();
        }
    }

    fn store(&mut self) {
        for eq in self.equations_mut() {
            eq.store();
        }
    }

    fn update_residuals(&mut self, ctx: &FlowContext<'_>) {
        for eq in self.equations_mut() {
            eq.record_residual(ctx);
        }
    }

    /// Largest scalar residual; −1 before any is recorded.
    fn residual(&self) -> Real {
        self.equations()
            .iter()
            .map(ScalarEquation::residual)
            .fold(NO_RESIDUAL, Real::max)
    }

    fn reset_residual(&mut self) {
        for eq in self.equations_mut() {
            eq.reset_residual();
        }
    }
}
