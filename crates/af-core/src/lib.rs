//! af-core: stable foundation for aeroflow.
//!
//! Contains:
//! - units (uom SI quantities for free-stream input)
//! - numeric (Real + tolerances + floors + float helpers)
//! - ids (compact IDs for mesh entities)
//! - field (vector/tensor aliases and the `FieldValue` abstraction)
//! - error (shared error types)

pub mod error;
pub mod field;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use field::{FieldValue, Tensor, Vec3, ddot, symm};
pub use ids::*;
pub use numeric::*;
pub use units::*;
