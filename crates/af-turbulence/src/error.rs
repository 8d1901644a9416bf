//! Error types for turbulence setup.

use af_flow::FlowError;
use af_relax::RelaxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TurbulenceError {
    #[error("Unknown turbulence model '{tag}'")]
    UnknownModel { tag: String },

    #[error("Model {model} solves {expected} equations, got {actual} free-stream values")]
    EquationCount {
        model: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Relaxation error: {0}")]
    Relax(#[from] RelaxError),
}

pub type TurbulenceResult<T> = Result<T, TurbulenceError>;
