//! af-thermo: equation of state and transport properties for aeroflow.
//!
//! Provides:
//! - Primitive `(p, U, T)` and conservative `(ρ, m, Eₜ)` state types
//! - `Thermodynamics` trait for conversions and transport properties
//! - Calorically perfect gas with constant or Sutherland viscosity
//!
//! # Example
//!
//! ```
//! use af_thermo::{PerfectGas, Primitive, Thermodynamics};
//! use af_core::Vec3;
//!
//! let gas = PerfectGas::air();
//! let free_stream = Primitive::new(101_325.0, Vec3::new(10.0, 0.0, 0.0), 300.0);
//! let cons = gas.conservative(&free_stream);
//! assert!((cons.rho - 101_325.0 / (287.0 * 300.0)).abs() < 1e-12);
//! ```

pub mod error;
pub mod model;
pub mod perfect_gas;
pub mod state;

pub use error::{ThermoError, ThermoResult};
pub use model::Thermodynamics;
pub use perfect_gas::{PerfectGas, Viscosity};
pub use state::{Conservative, Primitive};
