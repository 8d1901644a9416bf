//! Resolution of a case file into typed solver inputs.

use af_core::units::{k, mps, pa};
use af_core::{PatchId, Real, Vec3};
use af_flow::{
    DtBound, EntropyFix, FlowContext, FlowOptions, Limiter, MeanFlow, Physics, Reconstruction, TimeStepping,
};
use af_mesh::generate::CARTESIAN_PATCHES;
use af_mesh::{CartesianSpec, Communicator, Geometry, Mesh, MeshMotion, PatchKind};
use af_relax::{Normalization, SmoothingOptions};
use af_solver::{Solver, SolverOptions, UnsteadyOptions};
use af_thermo::{PerfectGas, Primitive, Viscosity};
use af_turbulence::{FreeStream, ModelKind, Turbulence, TurbulenceOptions};
use tracing::info;

use crate::schema::{
    CaseFile, DtBoundDef, FlowDef, GasDef, LimiterDef, MeshDef, MotionDef, NormalizationDef, PatchKindDef,
    PhysicsDef, SolverDef, SteppingDef, TurbulenceDef, ViscosityDef,
};
use crate::validate::{ValidationError, validate_case};
use crate::ConfigResult;

/// Pressure loads requested by the case.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadsRequest {
    pub patches: Vec<String>,
    pub reference_pressure: Real,
    pub centre: Vec3,
}

/// Everything needed to start a run.
#[derive(Debug, Clone)]
pub struct CaseSetup {
    pub name: String,
    pub mesh: Mesh,
    pub gas: PerfectGas,
    pub free_stream: Primitive,
    pub flow: FlowOptions,
    pub turbulence: ModelKind,
    pub turbulence_options: TurbulenceOptions,
    pub turbulence_free_stream: Option<Vec<Real>>,
    pub solver: SolverOptions,
    pub motion: Option<MeshMotion>,
    pub loads: Option<LoadsRequest>,
}

impl CaseFile {
    /// Validate and resolve every tag into typed options.
    pub fn into_setup(self) -> ConfigResult<CaseSetup> {
        validate_case(&self)?;

        let mesh = build_mesh(&self.mesh)?;
        let gas = build_gas(&self.gas)?;
        let fs = &self.free_stream;
        let [ux, uy, uz] = fs.velocity_mps;
        let free_stream = Primitive::from_si(pa(fs.pressure_pa), [mps(ux), mps(uy), mps(uz)], k(fs.temperature_k))?;

        let turbulence = if self.turbulence.strict {
            ModelKind::from_tag(self.turbulence.model.as_deref())?
        } else {
            ModelKind::from_tag_or_off(self.turbulence.model.as_deref())
        };
        let turbulence_options = turbulence_options(&self.turbulence);
        turbulence_options.validate()?;

        let mut solver = solver_options(&self.solver);
        let mut motion = None;
        if let Some(u) = &self.unsteady {
            solver.unsteady = Some(UnsteadyOptions {
                dt: u.dt_s,
                steps: u.steps,
                inner_iterations: u.inner_iterations,
                inner_tolerance: u.inner_tolerance,
            });
            motion = u.motion.map(|m| match m {
                MotionDef::Translation { velocity_mps } => MeshMotion::Translation {
                    velocity: Vec3::from(velocity_mps),
                },
                MotionDef::Stretch { axis, origin, rate } => MeshMotion::Stretch { axis, origin, rate },
            });
        }
        solver.validate()?;

        let loads = self.loads.map(|l| LoadsRequest {
            patches: l.patches,
            reference_pressure: l.reference_pressure_pa.unwrap_or(free_stream.p),
            centre: Vec3::from(l.centre),
        });

        info!(case = %self.name, cells = mesh.n_cells(), turbulence = %turbulence, "case resolved");
        Ok(CaseSetup {
            name: self.name,
            mesh,
            gas,
            free_stream,
            flow: flow_options(&self.flow),
            turbulence,
            turbulence_options,
            turbulence_free_stream: self.turbulence.free_stream,
            solver,
            motion,
            loads,
        })
    }
}

impl CaseSetup {
    /// Uniform free-stream initial state with the selected closure.
    pub fn build_solver(&self, comm: &dyn Communicator) -> ConfigResult<Solver> {
        let ctx = FlowContext::new(&self.mesh, &self.gas, comm);
        let flow = MeanFlow::uniform(&ctx, self.flow, self.free_stream)?;
        let turbulence = Turbulence::new(
            self.turbulence,
            &ctx,
            &flow,
            &self.turbulence_options,
            self.turbulence_free_stream.as_deref(),
        )?;
        Ok(Solver::new(self.solver.clone(), flow, turbulence)?)
    }
}

fn patch_kind(kind: &PatchKindDef) -> ConfigResult<PatchKind> {
    Ok(match kind {
        PatchKindDef::Wall => PatchKind::Wall,
        PatchKindDef::Symmetry => PatchKind::Symmetry,
        PatchKindDef::FarField => PatchKind::FarField,
        PatchKindDef::Extrapolated => PatchKind::Extrapolated,
        PatchKindDef::Empty => PatchKind::Empty,
        PatchKindDef::Cyclic { partner } => {
            let idx = CARTESIAN_PATCHES
                .iter()
                .position(|n| *n == partner.as_str())
                .ok_or_else(|| ValidationError::MissingReference {
                    id: partner.clone(),
                    context: "cyclic partner".to_string(),
                })?;
            PatchKind::Cyclic {
                partner: PatchId::from_index(idx as u32),
            }
        }
    })
}

fn build_mesh(def: &MeshDef) -> ConfigResult<Mesh> {
    let mesh = match def {
        MeshDef::Cartesian {
            cells,
            lengths,
            origin,
            patches,
        } => {
            let mut kinds = [PatchKind::Extrapolated; 6];
            for (slot, name) in kinds.iter_mut().zip(CARTESIAN_PATCHES) {
                if let Some(kind) = patches.get(name) {
                    *slot = patch_kind(kind)?;
                }
            }
            let mut spec = CartesianSpec::new(*cells, Vec3::from(*lengths)).with_kinds(kinds);
            spec.origin = Vec3::from(*origin);
            Mesh::cartesian(&spec)?
        }
        MeshDef::Strip {
            cells,
            length,
            left,
            right,
        } => Mesh::strip(*cells, *length, patch_kind(left)?, patch_kind(right)?)?,
    };
    Ok(mesh)
}

fn build_gas(def: &GasDef) -> ConfigResult<PerfectGas> {
    let viscosity = match def.viscosity {
        ViscosityDef::None => Viscosity::None,
        ViscosityDef::Constant { mu } => Viscosity::Constant(mu),
        ViscosityDef::Sutherland { mu_ref, t_ref, s } => Viscosity::Sutherland { mu_ref, t_ref, s },
    };
    Ok(PerfectGas::new(
        def.gas_constant,
        def.gamma,
        def.prandtl,
        def.turbulent_prandtl,
        viscosity,
    )?)
}

fn limiter(def: LimiterDef) -> Limiter {
    match def {
        LimiterDef::MinMod => Limiter::MinMod,
        LimiterDef::VanLeer => Limiter::VanLeer,
        LimiterDef::VanAlbada => Limiter::VanAlbada,
    }
}

fn reconstruction(high_resolution: bool, def: LimiterDef) -> Reconstruction {
    if high_resolution {
        Reconstruction::Muscl(limiter(def))
    } else {
        Reconstruction::FirstOrder
    }
}

fn normalization(def: NormalizationDef) -> Normalization {
    match def {
        NormalizationDef::None => Normalization::None,
        NormalizationDef::Max => Normalization::Max,
        NormalizationDef::Initial => Normalization::Initial,
    }
}

fn flow_options(def: &FlowDef) -> FlowOptions {
    FlowOptions {
        physics: match def.physics {
            PhysicsDef::Euler => Physics::Euler,
            PhysicsDef::NavierStokes => Physics::NavierStokes,
        },
        reconstruction: reconstruction(def.high_resolution, def.limiter),
        entropy_fix: EntropyFix {
            linear: def.entropy_fix_linear,
            nonlinear: def.entropy_fix_nonlinear,
        },
        roe_average: def.roe_average,
        density_floor: def.density_floor,
        normalization: normalization(def.normalization),
    }
}

fn set(slot: &mut Real, value: Option<Real>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn turbulence_options(def: &TurbulenceDef) -> TurbulenceOptions {
    let mut opts = TurbulenceOptions {
        reconstruction: reconstruction(def.high_resolution, def.limiter),
        normalization: normalization(def.normalization),
        floor: def.floor,
        free_stream: FreeStream {
            nu_tilde_ratio: def.nu_tilde_ratio,
            intensity: def.intensity,
            viscosity_ratio: def.viscosity_ratio,
        },
        ..TurbulenceOptions::default()
    };

    let sa = &def.spalart_allmaras;
    set(&mut opts.sa.sigma, sa.sigma);
    set(&mut opts.sa.kappa, sa.kappa);
    set(&mut opts.sa.cb1, sa.cb1);
    set(&mut opts.sa.cb2, sa.cb2);
    set(&mut opts.sa.cv1, sa.cv1);
    set(&mut opts.sa.cw2, sa.cw2);
    set(&mut opts.sa.cw3, sa.cw3);
    set(&mut opts.sa.fix, sa.entropy_fix);

    let sst = &def.k_omega_sst;
    set(&mut opts.sst.beta_star, sst.beta_star);
    set(&mut opts.sst.a1, sst.a1);
    set(&mut opts.sst.c1, sst.c1);
    set(&mut opts.sst.fix, sst.entropy_fix);
    opts
}

fn solver_options(def: &SolverDef) -> SolverOptions {
    SolverOptions {
        stages: def.stages.clone(),
        cfl: def.cfl,
        stepping: match def.stepping {
            SteppingDef::Local => TimeStepping::Local,
            SteppingDef::Global => TimeStepping::Global,
        },
        bound: match def.dt_bound {
            DtBoundDef::None => DtBound::None,
            DtBoundDef::Global { ratio } => DtBound::Global { ratio },
            DtBoundDef::Local { ratio } => DtBound::Local { ratio },
        },
        smoothing: SmoothingOptions {
            iterations: def.smoothing_iterations,
            epsilon: def.smoothing_epsilon,
        },
        max_iterations: def.max_iterations,
        tolerance: def.tolerance,
        log_every: def.log_every,
        unsteady: None,
    }
}
