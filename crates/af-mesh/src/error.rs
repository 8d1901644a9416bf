//! Mesh-specific error types.

use af_core::{CellId, CoreError, FaceId, PatchId};

pub type MeshResult<T> = Result<T, MeshError>;

/// Mesh construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A face refers to a cell that doesn't exist.
    InvalidCellRef { face: FaceId, cell: CellId },

    /// An internal face has the same cell on both sides.
    SelfConnectedFace { face: FaceId },

    /// A boundary face refers to a patch that doesn't exist.
    InvalidPatchRef { patch: PatchId },

    /// Cell volume is not positive.
    NonPositiveVolume { cell: CellId, volume: f64 },

    /// Face area vector has zero length.
    DegenerateFace { face: FaceId },

    /// Sum of outward area vectors of a cell does not vanish.
    OpenCell { cell: CellId, residual: f64 },

    /// Two patches share a name.
    DuplicatePatch { name: String },

    /// A cyclic patch does not match its partner.
    CyclicMismatch { patch: PatchId, partner: PatchId },

    /// Lookup of a patch by name failed.
    PatchNotFound { name: String },

    /// Invalid argument for a generator or motion.
    InvalidArg { what: &'static str },
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::InvalidCellRef { face, cell } => {
                write!(f, "Face {} refers to non-existent cell {}", face, cell)
            }
            MeshError::SelfConnectedFace { face } => {
                write!(f, "Face {} has the same cell on both sides", face)
            }
            MeshError::InvalidPatchRef { patch } => {
                write!(f, "Boundary face refers to non-existent patch {}", patch)
            }
            MeshError::NonPositiveVolume { cell, volume } => {
                write!(f, "Cell {} has non-positive volume {}", cell, volume)
            }
            MeshError::DegenerateFace { face } => {
                write!(f, "Face {} has a zero area vector", face)
            }
            MeshError::OpenCell { cell, residual } => {
                write!(
                    f,
                    "Cell {} is not closed (|sum of area vectors| = {:e})",
                    cell, residual
                )
            }
            MeshError::DuplicatePatch { name } => {
                write!(f, "Duplicate patch name '{}'", name)
            }
            MeshError::CyclicMismatch { patch, partner } => {
                write!(
                    f,
                    "Cyclic patch {} does not match partner {} (face count or back-reference)",
                    patch, partner
                )
            }
            MeshError::PatchNotFound { name } => {
                write!(f, "Patch '{}' not found", name)
            }
            MeshError::InvalidArg { what } => write!(f, "Invalid argument: {}", what),
        }
    }
}

impl std::error::Error for MeshError {}

impl From<CoreError> for MeshError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { what, .. } | CoreError::InvalidArg { what } => {
                MeshError::InvalidArg { what }
            }
            CoreError::IndexOob { what, .. }
            | CoreError::LengthMismatch { what, .. }
            | CoreError::Invariant { what } => MeshError::InvalidArg { what },
        }
    }
}
