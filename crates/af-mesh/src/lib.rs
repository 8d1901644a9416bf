//! af-mesh: finite-volume geometry for aeroflow.
//!
//! Provides:
//! - `Geometry`, the query surface the flow equations read metrics through
//! - `Mesh` with patches and extended (`LL | L |-> R | RR`) connectivity
//! - Incremental `MeshBuilder` with validation, plus Cartesian/strip generators
//! - ALE motion (previous volumes, face normal speeds) and transpiration
//! - Wall distance
//! - `Communicator` reductions and halo snapshots for coupled patches
//! - Green-Gauss gradients and patch-rule boundary correction
//!
//! # Example
//!
//! ```
//! use af_mesh::{Geometry, Mesh, PatchKind};
//!
//! let mesh = Mesh::strip(10, 1.0, PatchKind::Wall, PatchKind::Wall).unwrap();
//! assert_eq!(mesh.n_cells(), 10);
//! assert_eq!(mesh.n_internal_faces(), 9);
//! ```

pub mod boundary;
pub mod builder;
pub mod error;
pub mod generate;
pub mod geometry;
pub mod gradient;
pub mod halo;
pub mod mesh;
pub mod motion;
pub mod parallel;
pub(crate) mod validate;
pub mod wall_distance;

// Re-exports for ergonomics
pub use boundary::{BoundaryRule, correct_boundary_conditions};
pub use builder::MeshBuilder;
pub use error::{MeshError, MeshResult};
pub use generate::CartesianSpec;
pub use geometry::Geometry;
pub use gradient::{face_interpolate, green_gauss};
pub use halo::HaloField;
pub use mesh::{Mesh, Patch, PatchKind};
pub use motion::MeshMotion;
pub use parallel::{Communicator, SerialComm};
