//! Dual time-stepping source split.
//!
//! With physical step Δt (first-order backward difference) the pseudo-time
//! residual of an equation set is
//!
//! ```text
//! R*(U) = R(U) + (V U − Vⁿ Uⁿ) / Δt
//! ```
//!
//! The `Vⁿ Uⁿ / Δt` part only changes once per physical step. `DualTimeSplit`
//! captures it as a baseline at the start of the step and then adds the
//! remaining unsteady term on every inner iteration.

use af_core::{FieldValue, Real};

use crate::error::{RelaxError, RelaxResult};

/// Phase of a [`DualTimeSplit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No baseline; combining adds nothing.
    Idle,
    /// Baseline captured for the current physical step.
    Baseline,
}

/// Unsteady contribution `V U/Δt − Vⁿ Uⁿ/Δt` of one cell.
#[inline]
pub fn unsteady_contribution<T: FieldValue>(
    volume: Real,
    state: T,
    volume_old: Real,
    state_old: T,
    dt: Real,
) -> T {
    state * (volume / dt) - baseline_term(volume_old, state_old, dt)
}

#[inline]
fn baseline_term<T: FieldValue>(volume_old: Real, state_old: T, dt: Real) -> T {
    state_old * (volume_old / dt)
}

/// Two-phase baseline/unsteady-term split for one field.
#[derive(Clone, Debug)]
pub struct DualTimeSplit<T> {
    phase: Phase,
    baseline: Vec<T>,
    dt: Real,
}

impl<T: FieldValue> Default for DualTimeSplit<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FieldValue> DualTimeSplit<T> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            baseline: Vec::new(),
            dt: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Physical step of the captured baseline.
    pub fn dt(&self) -> Real {
        self.dt
    }

    /// Capture `Vⁿ Uⁿ / Δt` from the state stored at the start of the step.
    pub fn capture_baseline(
        &mut self,
        volumes_old: &[Real],
        state_old: &[T],
        dt: Real,
    ) -> RelaxResult<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(RelaxError::InvalidArg {
                what: "physical time step must be positive",
            });
        }
        if volumes_old.len() != state_old.len() {
            return Err(RelaxError::LengthMismatch {
                what: "dual-time baseline",
                expected: volumes_old.len(),
                actual: state_old.len(),
            });
        }
        self.baseline.clear();
        self.baseline.extend(
            volumes_old
                .iter()
                .zip(state_old)
                .map(|(&v, &u)| baseline_term(v, u, dt)),
        );
        self.dt = dt;
        self.phase = Phase::Baseline;
        Ok(())
    }

    /// Add `V U / Δt − baseline` to `rhs`. Does nothing while idle.
    pub fn combine_with_unsteady_term(&self, volumes: &[Real], state: &[T], rhs: &mut [T]) {
        if self.phase == Phase::Idle {
            return;
        }
        for (((r, &v), &u), &b) in rhs.iter_mut().zip(volumes).zip(state).zip(&self.baseline) {
            *r += u * (v / self.dt) - b;
        }
    }

    /// Drop the baseline (end of an unsteady run).
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.baseline.clear();
        self.dt = 0.0;
    }
}
