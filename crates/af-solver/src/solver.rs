//! Multistage pseudo-time driver.
//!
//! One pseudo-time iteration is
//!
//! ```text
//! updateDt → updateCo → for α in stages:
//!     reset rhs → advection → diffusion → source → body → [buildDTS(2)]
//!     → solve(α) → update
//! ```
//!
//! applied to the mean flow and the turbulence closure in lockstep. An
//! unsteady step brackets a number of these with `store` and `buildDTS(1)`.

use af_core::Real;
use af_flow::{FlowContext, MeanFlow};
use af_mesh::{Communicator, Mesh, MeshMotion};
use af_thermo::Thermodynamics;
use af_turbulence::Turbulence;
use tracing::{debug, debug_span, info, info_span, warn};

use crate::error::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::report::{IterationReport, RunSummary, StepReport};

/// Mean flow and turbulence closure advanced together.
#[derive(Clone, Debug)]
pub struct Solver {
    options: SolverOptions,
    flow: MeanFlow,
    turbulence: Turbulence,
    iteration: usize,
    step: usize,
    time: Real,
}

impl Solver {
    pub fn new(options: SolverOptions, mut flow: MeanFlow, turbulence: Turbulence) -> SolverResult<Self> {
        options.validate()?;
        flow.set_physical_dt(options.unsteady.map(|u| u.dt))?;
        info!(
            stages = options.stages.len(),
            cfl = options.cfl,
            turbulence = %turbulence.kind(),
            unsteady = options.unsteady.is_some(),
            "solver ready"
        );
        Ok(Self {
            options,
            flow,
            turbulence,
            iteration: 0,
            step: 0,
            time: 0.0,
        })
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn flow(&self) -> &MeanFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut MeanFlow {
        &mut self.flow
    }

    pub fn turbulence(&self) -> &Turbulence {
        &self.turbulence
    }

    pub fn turbulence_mut(&mut self) -> &mut Turbulence {
        &mut self.turbulence
    }

    /// Pseudo-time iterations done so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Physical time reached by an unsteady run.
    pub fn time(&self) -> Real {
        self.time
    }

    /// Refresh derived quantities after the state or the mesh changed.
    pub fn update(&mut self, ctx: &FlowContext<'_>) {
        self.flow.update(ctx);
        self.turbulence.update(ctx, &self.flow);
    }

    /// One multistage pseudo-time iteration.
    pub fn iterate(&mut self, ctx: &FlowContext<'_>) -> SolverResult<IterationReport> {
        let _span = debug_span!("iterate", iteration = self.iteration + 1).entered();
        let opts = &self.options;
        let flow = &mut self.flow;
        let turb = &mut self.turbulence;
        let unsteady = flow.physical_dt().is_some();
        let sweeps = opts.smoothing.iterations;
        let eps = opts.smoothing.epsilon;

        flow.update_dt(ctx, &turb.eddy(), opts.stepping, opts.cfl, opts.bound);
        flow.update_co(ctx);
        flow.begin_pseudo_step();
        turb.begin_pseudo_step();

        for (stage, &alpha) in opts.stages.iter().enumerate() {
            flow.reset_rhs();
            turb.reset_rhs();

            flow.advection(ctx);
            flow.diffusion(ctx, &turb.eddy());
            flow.source(ctx, false);
            flow.body(ctx, unsteady);
            turb.advection(ctx, flow);
            turb.diffusion(ctx, flow);
            turb.source(ctx, flow, false);
            turb.body(ctx, flow, unsteady);
            if unsteady {
                flow.build_dts(ctx, 2)?;
                turb.build_dts(ctx, flow, 2)?;
            }

            if stage == 0 {
                flow.update_residuals(ctx);
                turb.update_residuals(ctx);
            }

            flow.solve(ctx, alpha, sweeps, eps);
            turb.solve(ctx, flow, alpha, sweeps, eps);
            flow.update(ctx);
            turb.update(ctx, flow);
        }

        self.iteration += 1;
        let dt = flow.dt_stats();
        let co = flow.courant_stats();
        let report = IterationReport {
            iteration: self.iteration,
            flow_residual: flow.residual(),
            turbulence_residual: turb.residual(),
            dt_min: dt.min,
            dt_max: dt.max,
            courant_max: co.max,
            courant_mean: co.mean,
        };
        if !report.flow_residual.is_finite() || !report.turbulence_residual.is_finite() {
            warn!(iteration = self.iteration, "residual is not finite");
            return Err(SolverError::Diverged {
                iteration: self.iteration,
                residual: report.residual(),
            });
        }
        debug!(
            iteration = report.iteration,
            flow = report.flow_residual,
            turbulence = report.turbulence_residual,
            "pseudo-time iteration"
        );
        Ok(report)
    }

    /// Iterate until the residual drops below the tolerance or the iteration budget runs out.
    pub fn run_steady<F>(&mut self, ctx: &FlowContext<'_>, mut observer: F) -> SolverResult<RunSummary>
    where
        F: FnMut(&IterationReport),
    {
        if self.flow.physical_dt().is_some() {
            return Err(SolverError::InvalidArg {
                what: "steady run requested on an unsteady solver",
            });
        }
        let max = self.options.max_iterations;
        let tol = self.options.tolerance;
        let every = self.options.log_every;
        let mut converged = false;

        for _ in 0..max {
            let report = self.iterate(ctx)?;
            observer(&report);
            if report.iteration % every == 0 {
                info!(
                    iteration = report.iteration,
                    flow = report.flow_residual,
                    turbulence = report.turbulence_residual,
                    courant = report.courant_max,
                    "steady progress"
                );
            }
            if report.residual() >= 0.0 && report.residual() < tol {
                converged = true;
                break;
            }
        }

        let summary = self.summary(converged);
        info!(converged, iterations = summary.iterations, "steady run finished");
        Ok(summary)
    }

    /// One physical time step: store, capture the dual-time baseline and iterate.
    pub fn physical_step(&mut self, ctx: &FlowContext<'_>) -> SolverResult<StepReport> {
        let Some(unsteady) = self.options.unsteady else {
            return Err(SolverError::InvalidArg {
                what: "physical step requested on a steady solver",
            });
        };
        let _span = info_span!("physical_step", step = self.step + 1).entered();
        self.flow.store();
        self.turbulence.store();
        self.flow.build_dts(ctx, 1)?;
        self.turbulence.build_dts(ctx, &self.flow, 1)?;

        let mut inner = 0;
        let mut last = None;
        while inner < unsteady.inner_iterations {
            let report = self.iterate(ctx)?;
            inner += 1;
            let done = report.residual() >= 0.0 && report.residual() < unsteady.inner_tolerance;
            last = Some(report);
            if done {
                break;
            }
        }

        self.step += 1;
        self.time += unsteady.dt;
        let last = last.ok_or(SolverError::InvalidArg {
            what: "inner_iterations must be positive",
        })?;
        debug!(step = self.step, time = self.time, inner, "physical step done");
        Ok(StepReport {
            step: self.step,
            time: self.time,
            inner_iterations: inner,
            last,
        })
    }

    /// Run every physical step, moving the mesh first when `motion` is given.
    pub fn run_unsteady<F>(
        &mut self,
        mesh: &mut Mesh,
        thermo: &dyn Thermodynamics,
        comm: &dyn Communicator,
        motion: Option<MeshMotion>,
        mut observer: F,
    ) -> SolverResult<RunSummary>
    where
        F: FnMut(&StepReport),
    {
        let Some(unsteady) = self.options.unsteady else {
            return Err(SolverError::InvalidArg {
                what: "unsteady run requested on a steady solver",
            });
        };
        let every = self.options.log_every;

        for _ in 0..unsteady.steps {
            if let Some(m) = &motion {
                mesh.advance(m, unsteady.dt)?;
            }
            {
                let ctx = FlowContext::new(&*mesh, thermo, comm);
                if motion.is_some() {
                    self.update(&ctx);
                }
                let report = self.physical_step(&ctx)?;
                observer(&report);
                if report.step % every == 0 {
                    info!(
                        step = report.step,
                        time = report.time,
                        inner = report.inner_iterations,
                        residual = report.last.residual(),
                        "unsteady progress"
                    );
                }
            }
            mesh.acknowledge_motion();
        }

        let summary = self.summary(true);
        info!(steps = summary.physical_steps, time = summary.time, "unsteady run finished");
        Ok(summary)
    }

    fn summary(&self, converged: bool) -> RunSummary {
        RunSummary {
            converged,
            iterations: self.iteration,
            physical_steps: self.step,
            time: self.time,
            flow_residual: self.flow.residual(),
            turbulence_residual: self.turbulence.residual(),
            turbulence_model: self.turbulence.kind().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::Vec3;
    use af_flow::FlowOptions;
    use af_mesh::{PatchKind, SerialComm};
    use af_thermo::{PerfectGas, Primitive};

    fn strip_solver(options: SolverOptions) -> (Mesh, PerfectGas, Solver) {
        let mesh = Mesh::strip(10, 1.0, PatchKind::FarField, PatchKind::FarField).unwrap();
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let state = Primitive::new(1e5, Vec3::new(20.0, 0.0, 0.0), 300.0);
        let flow = MeanFlow::uniform(&ctx, FlowOptions::euler(), state).unwrap();
        let solver = Solver::new(options, flow, Turbulence::Off).unwrap();
        (mesh, gas, solver)
    }

    #[test]
    fn uniform_strip_converges_immediately() {
        let (mesh, gas, mut solver) = strip_solver(SolverOptions::default());
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut seen = 0;
        let summary = solver.run_steady(&ctx, |_| seen += 1).unwrap();
        assert!(summary.converged);
        assert_eq!(summary.iterations, 1);
        assert_eq!(seen, 1);
        assert_eq!(summary.flow_residual, 0.0);
        assert_eq!(summary.turbulence_residual, -1.0);
        assert_eq!(summary.turbulence_model, "off");
    }

    #[test]
    fn steady_and_unsteady_entry_points_are_exclusive() {
        let (mesh, gas, mut solver) = strip_solver(SolverOptions::default());
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        assert!(solver.physical_step(&ctx).is_err());

        let options = SolverOptions {
            unsteady: Some(crate::UnsteadyOptions::default()),
            ..SolverOptions::default()
        };
        let (mesh, gas, mut solver) = strip_solver(options);
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        assert!(solver.run_steady(&ctx, |_| {}).is_err());
        assert_eq!(solver.flow().physical_dt(), Some(1e-3));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mesh = Mesh::strip(4, 1.0, PatchKind::FarField, PatchKind::FarField).unwrap();
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let state = Primitive::new(1e5, Vec3::zeros(), 300.0);
        let flow = MeanFlow::uniform(&ctx, FlowOptions::euler(), state).unwrap();
        let options = SolverOptions {
            cfl: -1.0,
            ..SolverOptions::default()
        };
        assert!(matches!(
            Solver::new(options, flow, Turbulence::Off),
            Err(SolverError::InvalidArg { .. })
        ));
    }
}
