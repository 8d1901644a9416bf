//! af-flow: mean-flow equations of aeroflow.
//!
//! Provides:
//! - `MeanFlow`: density/momentum/energy fields and their rhs bookkeeping
//! - Roe flux with separate entropy fixes for linear and non-linear waves
//! - MUSCL reconstruction on the `LL | L |-> R | RR` stencil
//! - Viscous fluxes with laminar plus eddy viscosity
//! - Courant numbers and local/global pseudo time steps
//! - `FlowContext`, the borrowed handles every operator receives

pub mod boundary;
pub mod context;
pub mod diffusion;
pub mod error;
pub mod limiter;
pub mod navier_stokes;
pub mod options;
pub mod roe;
pub mod stats;
pub mod time_step;

pub use context::{EddyView, FlowContext};
pub use error::{FlowError, FlowResult};
pub use limiter::Limiter;
pub use navier_stokes::MeanFlow;
pub use options::{DtBound, EntropyFix, FlowOptions, Physics, Reconstruction, TimeStepping};
pub use roe::{FaceState, Flux, roe_flux};
pub use stats::FieldStats;
