//! Core mesh data structures.

use core::ops::Range;

use af_core::{PatchId, Real, Vec3};

use crate::error::{MeshError, MeshResult};
use crate::geometry::Geometry;

/// Boundary condition family of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    /// Solid wall: slip for inviscid flow, no-slip for viscous flow.
    Wall,
    /// Plane of symmetry.
    Symmetry,
    /// Far-field ghost state.
    FarField,
    /// Zero-gradient outflow.
    Extrapolated,
    /// Sides of a 1-D/2-D mesh; contributes nothing.
    Empty,
    /// Periodic pairing with a partner patch, face `i` to face `i`.
    Cyclic { partner: PatchId },
    /// Partition boundary; the neighbour side lives on another rank.
    Processor { neighbour_rank: usize },
}

impl PatchKind {
    /// Coupled patches take their neighbour state from a halo snapshot.
    pub fn is_coupled(&self) -> bool {
        matches!(self, PatchKind::Cyclic { .. } | PatchKind::Processor { .. })
    }
}

/// A named, contiguous range of boundary faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub id: PatchId,
    pub name: String,
    pub kind: PatchKind,
    pub(crate) start: usize,
    pub(crate) len: usize,
}

impl Patch {
    /// Global face indices of this patch.
    pub fn faces(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A validated finite-volume mesh.
///
/// The mesh stores:
/// - Per-cell centres and volumes (current and previous).
/// - Per-face owner/neighbour, area vectors, centres, weights and normal speeds.
/// - Compact adjacency: for each cell, its faces and face neighbours.
/// - Extended connectivity `LL | L |-> R | RR` for limited reconstruction.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) cell_centres: Vec<Vec3>,
    pub(crate) volumes: Vec<Real>,
    pub(crate) volumes_old: Vec<Real>,

    pub(crate) owner: Vec<usize>,
    pub(crate) neighbour: Vec<usize>,
    pub(crate) area_vectors: Vec<Vec3>,
    pub(crate) areas: Vec<Real>,
    pub(crate) face_centres: Vec<Vec3>,
    pub(crate) weights: Vec<Real>,
    pub(crate) face_speeds: Vec<Real>,

    pub(crate) far_owner: Vec<Option<usize>>,
    pub(crate) far_neighbour: Vec<Option<usize>>,
    pub(crate) ghost_centres: Vec<Vec3>,
    pub(crate) transpiration: Vec<Real>,

    pub(crate) patches: Vec<Patch>,

    /// Offsets for cell->face adjacency: cell i's faces are in cell_faces[cell_face_offsets[i]..cell_face_offsets[i+1]].
    pub(crate) cell_face_offsets: Vec<usize>,
    pub(crate) cell_faces: Vec<usize>,
    pub(crate) cell_cell_offsets: Vec<usize>,
    pub(crate) cell_cells: Vec<usize>,

    pub(crate) wall_distance: Vec<Real>,
    pub(crate) moved: bool,
}

impl Mesh {
    /// Look up a patch by name.
    pub fn patch_id(&self, name: &str) -> MeshResult<PatchId> {
        self.patches
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .ok_or_else(|| MeshError::PatchNotFound {
                name: name.to_string(),
            })
    }

    pub fn patch(&self, id: PatchId) -> Option<&Patch> {
        self.patches.get(id.idx())
    }

    /// Change the boundary family of a non-coupled patch.
    ///
    /// Coupled kinds must be declared when the mesh is built, since they
    /// change the ghost geometry.
    pub fn set_patch_kind(&mut self, name: &str, kind: PatchKind) -> MeshResult<()> {
        let id = self.patch_id(name)?;
        if kind.is_coupled() || self.patches[id.idx()].kind.is_coupled() {
            return Err(MeshError::InvalidArg {
                what: "coupled patch kinds are fixed at build time",
            });
        }
        let was_wall = self.patches[id.idx()].kind == PatchKind::Wall;
        self.patches[id.idx()].kind = kind;
        if was_wall || kind == PatchKind::Wall {
            self.update_wall_distance();
        }
        Ok(())
    }

    /// Clear the moved flag once derived quantities have been refreshed.
    pub fn acknowledge_motion(&mut self) {
        self.moved = false;
    }

    /// Total volume of the mesh.
    pub fn total_volume(&self) -> Real {
        self.volumes.iter().sum()
    }
}

impl Geometry for Mesh {
    fn n_cells(&self) -> usize {
        self.volumes.len()
    }

    fn n_faces(&self) -> usize {
        self.owner.len()
    }

    fn n_internal_faces(&self) -> usize {
        self.neighbour.len()
    }

    fn owner(&self) -> &[usize] {
        &self.owner
    }

    fn neighbour(&self) -> &[usize] {
        &self.neighbour
    }

    fn area_vectors(&self) -> &[Vec3] {
        &self.area_vectors
    }

    fn areas(&self) -> &[Real] {
        &self.areas
    }

    fn face_centres(&self) -> &[Vec3] {
        &self.face_centres
    }

    fn cell_centres(&self) -> &[Vec3] {
        &self.cell_centres
    }

    fn volumes(&self) -> &[Real] {
        &self.volumes
    }

    fn volumes_old(&self) -> &[Real] {
        &self.volumes_old
    }

    fn weights(&self) -> &[Real] {
        &self.weights
    }

    fn face_speeds(&self) -> &[Real] {
        &self.face_speeds
    }

    fn transpiration(&self) -> &[Real] {
        &self.transpiration
    }

    fn far_owner(&self) -> &[Option<usize>] {
        &self.far_owner
    }

    fn far_neighbour(&self) -> &[Option<usize>] {
        &self.far_neighbour
    }

    fn ghost_centres(&self) -> &[Vec3] {
        &self.ghost_centres
    }

    fn patches(&self) -> &[Patch] {
        &self.patches
    }

    fn wall_distance(&self) -> &[Real] {
        &self.wall_distance
    }

    fn cell_faces(&self, cell: usize) -> &[usize] {
        if cell >= self.volumes.len() {
            return &[];
        }
        &self.cell_faces[self.cell_face_offsets[cell]..self.cell_face_offsets[cell + 1]]
    }

    fn cell_neighbours(&self, cell: usize) -> &[usize] {
        if cell >= self.volumes.len() {
            return &[];
        }
        &self.cell_cells[self.cell_cell_offsets[cell]..self.cell_cell_offsets[cell + 1]]
    }

    fn has_moved(&self) -> bool {
        self.moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_kind_coupling() {
        assert!(!PatchKind::Wall.is_coupled());
        assert!(!PatchKind::Empty.is_coupled());
        assert!(
            PatchKind::Cyclic {
                partner: PatchId::from_index(1)
            }
            .is_coupled()
        );
        assert!(PatchKind::Processor { neighbour_rank: 2 }.is_coupled());
    }

    #[test]
    fn patch_face_range() {
        let patch = Patch {
            id: PatchId::from_index(0),
            name: "inlet".into(),
            kind: PatchKind::FarField,
            start: 12,
            len: 3,
        };
        assert_eq!(patch.faces(), 12..15);
        assert!(!patch.is_empty());
    }
}
