//! af-solver: pseudo-time and dual-time drivers for aeroflow.
//!
//! Provides:
//! - `SolverOptions`: stage coefficients, CFL, time-step policy, smoothing, stopping
//! - `Solver`: one mean flow plus its turbulence closure, advanced together
//! - Steady runs to a residual threshold and unsteady runs with dual time-stepping
//! - Pressure loads on named patches

pub mod error;
pub mod loads;
pub mod options;
pub mod report;
pub mod solver;

pub use error::{SolverError, SolverResult};
pub use loads::{Loads, pressure_loads};
pub use options::{SolverOptions, UnsteadyOptions};
pub use report::{IterationReport, RunSummary, StepReport};
pub use solver::Solver;
