//! Error types for solver runs.

use af_flow::FlowError;
use af_mesh::MeshError;
use af_relax::RelaxError;
use af_turbulence::TurbulenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown patch '{name}'")]
    UnknownPatch { name: String },

    #[error("Diverged at iteration {iteration}: residual = {residual}")]
    Diverged { iteration: usize, residual: f64 },

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Turbulence error: {0}")]
    Turbulence(#[from] TurbulenceError),

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Relaxation error: {0}")]
    Relax(#[from] RelaxError),
}

pub type SolverResult<T> = Result<T, SolverError>;
