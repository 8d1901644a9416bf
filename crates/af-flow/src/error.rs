//! Error types for mean-flow setup.

use af_mesh::MeshError;
use af_relax::RelaxError;
use af_thermo::ThermoError;
use thiserror::Error;

/// Errors raised while configuring the mean-flow equations.
///
/// Operators on the hot path never fail; these cover construction and
/// misuse of the dual-time state machine.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Thermodynamics error: {0}")]
    Thermo(#[from] ThermoError),

    #[error("Relaxation error: {0}")]
    Relax(#[from] RelaxError),
}

pub type FlowResult<T> = Result<T, FlowError>;
