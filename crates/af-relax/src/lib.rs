//! af-relax: pseudo-time relaxation shared by every equation set.
//!
//! Provides:
//! - `ResidualTracker` with `None` / `Max` / `Initial` normalisation
//! - Implicit residual smoothing of an rhs array
//! - `DualTimeSplit`, the baseline/unsteady-term state machine of dual time-stepping
//! - The explicit and point-implicit update kernels used by `solve`

pub mod dual_time;
pub mod error;
pub mod residual;
pub mod smoothing;
pub mod update;

pub use dual_time::{DualTimeSplit, Phase, unsteady_contribution};
pub use error::{RelaxError, RelaxResult};
pub use residual::{Normalization, ResidualTracker, rms};
pub use smoothing::{SmoothingOptions, smooth_rhs};
pub use update::{explicit_update, implicit_factor, point_implicit_update};
