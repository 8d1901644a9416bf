//! af-turbulence: RANS closures for aeroflow.
//!
//! Provides:
//! - `Turbulence`, a sum type over `Off`, Spalart-Allmaras and k-ω SST chosen once at setup
//! - `TurbulenceModel`, the capability interface the closures implement
//! - `ScalarEquation`, shared storage and operators of one transported scalar
//! - Model tags with strict and lenient parsing
//!
//! Closures are solved in kinematic form for `ν̃` or `(k, ω)` and hand the
//! mean flow an eddy viscosity and (for SST) a turbulent kinetic energy.

pub mod error;
pub mod kind;
pub mod kinematics;
pub mod k_omega_sst;
pub mod model;
pub mod options;
pub mod scalar;
pub mod spalart_allmaras;
pub mod turbulence;

pub use error::{TurbulenceError, TurbulenceResult};
pub use k_omega_sst::{KOmegaSst, SstSource};
pub use kind::ModelKind;
pub use model::TurbulenceModel;
pub use options::{FreeStream, SaConstants, SstConstants, TurbulenceOptions};
pub use scalar::ScalarEquation;
pub use spalart_allmaras::{SaSource, SpalartAllmaras};
pub use turbulence::Turbulence;
