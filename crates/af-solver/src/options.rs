//! Run controls.

use af_core::Real;
use af_flow::{DtBound, TimeStepping};
use af_relax::SmoothingOptions;

use crate::error::{SolverError, SolverResult};

/// Physical time stepping of an unsteady run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnsteadyOptions {
    /// Physical time step [s].
    pub dt: Real,
    /// Number of physical steps.
    pub steps: usize,
    /// Pseudo-time iterations per physical step.
    pub inner_iterations: usize,
    /// Inner loop stops early once the residual drops below this.
    pub inner_tolerance: Real,
}

impl Default for UnsteadyOptions {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            steps: 100,
            inner_iterations: 30,
            inner_tolerance: 1e-3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolverOptions {
    /// Multistage coefficients, one `solve` per entry.
    pub stages: Vec<Real>,
    pub cfl: Real,
    pub stepping: TimeStepping,
    pub bound: DtBound,
    pub smoothing: SmoothingOptions,
    /// Pseudo-time iterations of a steady run.
    pub max_iterations: usize,
    /// Steady runs stop once the larger of the flow and turbulence residuals drops below this.
    pub tolerance: Real,
    /// Emit a progress line every this many iterations.
    pub log_every: usize,
    pub unsteady: Option<UnsteadyOptions>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            stages: vec![0.25, 1.0 / 3.0, 0.5, 1.0],
            cfl: 1.0,
            stepping: TimeStepping::Local,
            bound: DtBound::default(),
            smoothing: SmoothingOptions::default(),
            max_iterations: 1000,
            tolerance: 1e-6,
            log_every: 50,
            unsteady: None,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> SolverResult<()> {
        if self.stages.is_empty() {
            return Err(SolverError::InvalidArg {
                what: "at least one stage coefficient is required",
            });
        }
        if self.stages.iter().any(|a| !(a.is_finite() && *a > 0.0 && *a <= 1.0)) {
            return Err(SolverError::InvalidArg {
                what: "stage coefficients must lie in (0, 1]",
            });
        }
        if !(self.cfl.is_finite() && self.cfl > 0.0) {
            return Err(SolverError::InvalidArg {
                what: "CFL must be positive",
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SolverError::InvalidArg {
                what: "tolerance must be non-negative",
            });
        }
        if self.log_every == 0 {
            return Err(SolverError::InvalidArg {
                what: "log_every must be positive",
            });
        }
        self.bound.validate()?;
        self.smoothing.validate()?;
        if let Some(u) = &self.unsteady {
            if !(u.dt.is_finite() && u.dt > 0.0) {
                return Err(SolverError::InvalidArg {
                    what: "physical time step must be positive",
                });
            }
            if u.inner_iterations == 0 {
                return Err(SolverError::InvalidArg {
                    what: "inner_iterations must be positive",
                });
            }
        }
        Ok(())
    }
}
