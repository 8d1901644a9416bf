//! Per-iteration and per-run summaries.

use af_core::Real;
use serde::Serialize;

/// State of the run after one pseudo-time iteration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IterationReport {
    pub iteration: usize,
    /// Largest of the density, momentum and energy residuals.
    pub flow_residual: Real,
    /// Largest turbulence residual, −1 without a closure.
    pub turbulence_residual: Real,
    pub dt_min: Real,
    pub dt_max: Real,
    pub courant_max: Real,
    pub courant_mean: Real,
}

impl IterationReport {
    /// Residual the stopping test looks at.
    pub fn residual(&self) -> Real {
        self.flow_residual.max(self.turbulence_residual)
    }
}

/// Outcome of one physical step of an unsteady run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub time: Real,
    pub inner_iterations: usize,
    pub last: IterationReport,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub converged: bool,
    pub iterations: usize,
    pub physical_steps: usize,
    pub time: Real,
    pub flow_residual: Real,
    pub turbulence_residual: Real,
    pub turbulence_model: String,
}
