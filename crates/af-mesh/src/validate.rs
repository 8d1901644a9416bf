//! Mesh validation logic.

use std::collections::HashSet;

use af_core::{CellId, FaceId, Real, Vec3};

use crate::builder::MeshBuilder;
use crate::error::{MeshError, MeshResult};
use crate::mesh::{Patch, PatchKind};

/// Relative tolerance on the closure of a cell's area vectors.
const CLOSURE_TOL: Real = 1e-9;

/// Validate references, volumes and patch names before assembly.
pub(crate) fn validate_structure(b: &MeshBuilder) -> MeshResult<()> {
    if let Some(&patch) = b.orphan_patch_refs.first() {
        return Err(MeshError::InvalidPatchRef { patch });
    }

    let n_cells = b.cells.len();
    if n_cells == 0 {
        return Err(MeshError::InvalidArg {
            what: "mesh has no cells",
        });
    }

    // Every cell must have a positive, finite volume
    for (i, c) in b.cells.iter().enumerate() {
        if !(c.volume.is_finite() && c.volume > 0.0) {
            return Err(MeshError::NonPositiveVolume {
                cell: CellId::from_index(i as u32),
                volume: c.volume,
            });
        }
    }

    // Face references
    let boundary = b.patches.iter().flat_map(|p| p.faces.iter());
    for (i, face) in b.internal.iter().chain(boundary).enumerate() {
        let id = FaceId::from_index(i as u32);
        if face.owner.idx() >= n_cells {
            return Err(MeshError::InvalidCellRef {
                face: id,
                cell: face.owner,
            });
        }
        if let Some(n) = face.neighbour {
            if n.idx() >= n_cells {
                return Err(MeshError::InvalidCellRef { face: id, cell: n });
            }
            if n == face.owner {
                return Err(MeshError::SelfConnectedFace { face: id });
            }
        }
    }

    // Patch names must be unique
    let mut names = HashSet::new();
    for p in &b.patches {
        if !names.insert(p.name.as_str()) {
            return Err(MeshError::DuplicatePatch {
                name: p.name.clone(),
            });
        }
    }

    Ok(())
}

/// Every face must have a non-zero area.
pub(crate) fn validate_faces(areas: &[Real]) -> MeshResult<()> {
    for (i, &a) in areas.iter().enumerate() {
        if !(a.is_finite() && a > 0.0) {
            return Err(MeshError::DegenerateFace {
                face: FaceId::from_index(i as u32),
            });
        }
    }
    Ok(())
}

/// Cyclic patches must pair up with equal face counts.
pub(crate) fn validate_cyclic(patches: &[Patch]) -> MeshResult<()> {
    for p in patches {
        if let PatchKind::Cyclic { partner } = p.kind {
            let Some(q) = patches.get(partner.idx()) else {
                return Err(MeshError::InvalidPatchRef { patch: partner });
            };
            let back = matches!(q.kind, PatchKind::Cyclic { partner } if partner == p.id);
            if !back || q.len != p.len || q.id == p.id {
                return Err(MeshError::CyclicMismatch {
                    patch: p.id,
                    partner,
                });
            }
        }
    }
    Ok(())
}

/// The outward area vectors of every cell must sum to zero.
pub(crate) fn validate_closed(
    owner: &[usize],
    area_vectors: &[Vec3],
    areas: &[Real],
    offsets: &[usize],
    cell_faces: &[usize],
) -> MeshResult<()> {
    for cell in 0..offsets.len() - 1 {
        let mut sum = Vec3::zeros();
        let mut scale = 0.0;
        for &f in &cell_faces[offsets[cell]..offsets[cell + 1]] {
            if owner[f] == cell {
                sum += area_vectors[f];
            } else {
                sum -= area_vectors[f];
            }
            scale += areas[f];
        }
        let residual = sum.norm();
        if residual > CLOSURE_TOL * scale {
            return Err(MeshError::OpenCell {
                cell: CellId::from_index(cell as u32),
                residual,
            });
        }
    }
    Ok(())
}
