//! Error types for relaxation options.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelaxError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type RelaxResult<T> = Result<T, RelaxError>;
