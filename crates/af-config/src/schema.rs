//! Case file schema definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseFile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    pub mesh: MeshDef,
    #[serde(default)]
    pub gas: GasDef,
    pub free_stream: FreeStreamDef,
    #[serde(default)]
    pub flow: FlowDef,
    #[serde(default)]
    pub turbulence: TurbulenceDef,
    #[serde(default)]
    pub solver: SolverDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsteady: Option<UnsteadyDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loads: Option<LoadsDef>,
}

fn default_version() -> u32 {
    crate::LATEST_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshDef {
    /// Axis-aligned box; patches are `xmin, xmax, ymin, ymax, zmin, zmax`.
    Cartesian {
        cells: [usize; 3],
        lengths: [f64; 3],
        #[serde(default)]
        origin: [f64; 3],
        /// Kind per patch name; unnamed patches are extrapolated.
        #[serde(default)]
        patches: BTreeMap<String, PatchKindDef>,
    },
    /// One-dimensional strip along x with ends `xmin` and `xmax`.
    Strip {
        cells: usize,
        length: f64,
        left: PatchKindDef,
        right: PatchKindDef,
    },
}

/// Boundary kind of one patch, written `{type: wall}` or `{type: cyclic, partner: xmax}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatchKindDef {
    Wall,
    Symmetry,
    FarField,
    Extrapolated,
    Empty,
    Cyclic { partner: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GasDef {
    pub gas_constant: f64,
    pub gamma: f64,
    pub prandtl: f64,
    pub turbulent_prandtl: f64,
    pub viscosity: ViscosityDef,
}

impl Default for GasDef {
    fn default() -> Self {
        Self {
            gas_constant: 287.0,
            gamma: 1.4,
            prandtl: 0.72,
            turbulent_prandtl: 0.9,
            viscosity: ViscosityDef::Sutherland {
                mu_ref: 1.716e-5,
                t_ref: 273.15,
                s: 110.4,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViscosityDef {
    None,
    Constant { mu: f64 },
    Sutherland { mu_ref: f64, t_ref: f64, s: f64 },
}

/// Far-field state, also the initial condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreeStreamDef {
    pub pressure_pa: f64,
    pub velocity_mps: [f64; 3],
    pub temperature_k: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhysicsDef {
    Euler,
    #[default]
    NavierStokes,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LimiterDef {
    #[default]
    MinMod,
    VanLeer,
    VanAlbada,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationDef {
    None,
    #[default]
    Max,
    Initial,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowDef {
    pub physics: PhysicsDef,
    /// Limited MUSCL reconstruction; first order when off.
    pub high_resolution: bool,
    pub limiter: LimiterDef,
    pub entropy_fix_linear: f64,
    pub entropy_fix_nonlinear: f64,
    pub roe_average: bool,
    pub density_floor: f64,
    pub normalization: NormalizationDef,
}

impl Default for FlowDef {
    fn default() -> Self {
        Self {
            physics: PhysicsDef::default(),
            high_resolution: true,
            limiter: LimiterDef::default(),
            entropy_fix_linear: 0.05,
            entropy_fix_nonlinear: 0.05,
            roe_average: true,
            density_floor: af_core::DENSITY_FLOOR,
            normalization: NormalizationDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TurbulenceDef {
    /// `off`, `SpalartAllmaras`/`SA` or `KappaOmega`/`KW`; absent means off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Reject unknown model tags. Otherwise they fall back to off with a warning.
    pub strict: bool,
    /// One value per transported scalar; derived from the mean far field when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_stream: Option<Vec<f64>>,
    pub high_resolution: bool,
    pub limiter: LimiterDef,
    pub floor: f64,
    pub normalization: NormalizationDef,
    pub nu_tilde_ratio: f64,
    pub intensity: f64,
    pub viscosity_ratio: f64,
    pub spalart_allmaras: SaOverrides,
    pub k_omega_sst: SstOverrides,
}

impl Default for TurbulenceDef {
    fn default() -> Self {
        Self {
            model: None,
            strict: false,
            free_stream: None,
            high_resolution: true,
            limiter: LimiterDef::default(),
            floor: af_core::SCALAR_FLOOR,
            normalization: NormalizationDef::default(),
            nu_tilde_ratio: 3.0,
            intensity: 0.01,
            viscosity_ratio: 10.0,
            spalart_allmaras: SaOverrides::default(),
            k_omega_sst: SstOverrides::default(),
        }
    }
}

/// Spalart-Allmaras constants replacing the standard values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SaOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kappa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cb1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cb2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cw2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cw3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_fix: Option<f64>,
}

/// k-ω SST constants replacing the standard values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SstOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_star: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_fix: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SteppingDef {
    #[default]
    Local,
    Global,
}

/// Pseudo-timestep bound, written `{type: local, ratio: 50.0}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DtBoundDef {
    None,
    Global { ratio: f64 },
    Local { ratio: f64 },
}

impl Default for DtBoundDef {
    fn default() -> Self {
        DtBoundDef::Global { ratio: 100.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub stages: Vec<f64>,
    pub cfl: f64,
    pub stepping: SteppingDef,
    pub dt_bound: DtBoundDef,
    pub smoothing_iterations: usize,
    pub smoothing_epsilon: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub log_every: usize,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            stages: vec![0.25, 1.0 / 3.0, 0.5, 1.0],
            cfl: 1.0,
            stepping: SteppingDef::default(),
            dt_bound: DtBoundDef::default(),
            smoothing_iterations: 0,
            smoothing_epsilon: 0.0,
            max_iterations: 1000,
            tolerance: 1e-6,
            log_every: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnsteadyDef {
    pub dt_s: f64,
    pub steps: usize,
    #[serde(default = "default_inner_iterations")]
    pub inner_iterations: usize,
    #[serde(default = "default_inner_tolerance")]
    pub inner_tolerance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionDef>,
}

fn default_inner_iterations() -> usize {
    30
}

fn default_inner_tolerance() -> f64 {
    1e-3
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionDef {
    Translation { velocity_mps: [f64; 3] },
    Stretch { axis: usize, origin: f64, rate: f64 },
}

/// Pressure loads reported after the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadsDef {
    pub patches: Vec<String>,
    /// Defaults to the free-stream pressure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_pressure_pa: Option<f64>,
    #[serde(default)]
    pub centre: [f64; 3],
}
