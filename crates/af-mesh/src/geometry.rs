//! Read-only query surface over mesh metrics.

use af_core::{Real, Vec3};

use crate::mesh::Patch;

/// Metrics consumed by the flow and turbulence equations.
///
/// Face numbering: internal faces come first (`0..n_internal_faces()`),
/// boundary faces follow, grouped contiguously by patch. Per-boundary-face
/// arrays are indexed by `face - n_internal_faces()`.
///
/// Area vectors point from owner to neighbour, and outward on boundary faces.
pub trait Geometry {
    fn n_cells(&self) -> usize;

    fn n_faces(&self) -> usize;

    fn n_internal_faces(&self) -> usize;

    fn n_boundary_faces(&self) -> usize {
        self.n_faces() - self.n_internal_faces()
    }

    /// Owner cell of every face.
    fn owner(&self) -> &[usize];

    /// Neighbour cell of every internal face.
    fn neighbour(&self) -> &[usize];

    fn area_vectors(&self) -> &[Vec3];

    /// Magnitudes of the area vectors.
    fn areas(&self) -> &[Real];

    fn face_centres(&self) -> &[Vec3];

    fn cell_centres(&self) -> &[Vec3];

    fn volumes(&self) -> &[Real];

    /// Volumes at the previous physical time level (equal to `volumes` on a static mesh).
    fn volumes_old(&self) -> &[Real];

    /// Owner-side interpolation weight of every face (1 on boundary faces).
    fn weights(&self) -> &[Real];

    /// Normal speed of every face due to mesh motion.
    fn face_speeds(&self) -> &[Real];

    /// Transpiration normal velocity per boundary face.
    fn transpiration(&self) -> &[Real];

    /// Cell behind the owner, opposite the face (`LL`).
    fn far_owner(&self) -> &[Option<usize>];

    /// Cell behind the neighbour, opposite the face (`RR`). `None` on boundary faces.
    fn far_neighbour(&self) -> &[Option<usize>];

    /// Per boundary face, the centre of the cell across it (partner cell for
    /// cyclic faces, mirrored owner for processor faces, the face centre otherwise).
    fn ghost_centres(&self) -> &[Vec3];

    fn patches(&self) -> &[Patch];

    /// Distance from each cell centre to the nearest wall face.
    fn wall_distance(&self) -> &[Real];

    fn cell_faces(&self, cell: usize) -> &[usize];

    /// Cells sharing an internal face with `cell`.
    fn cell_neighbours(&self, cell: usize) -> &[usize];

    /// True when the mesh moved since motion was last acknowledged.
    fn has_moved(&self) -> bool;

    fn patch_by_name(&self, name: &str) -> Option<&Patch> {
        self.patches().iter().find(|p| p.name == name)
    }

    /// Patch containing a boundary face.
    fn patch_of_face(&self, face: usize) -> Option<&Patch> {
        self.patches().iter().find(|p| p.faces().contains(&face))
    }

    /// Unit normal of a face.
    fn unit_normal(&self, face: usize) -> Vec3 {
        self.area_vectors()[face] / self.areas()[face]
    }

    /// Vector from the owner centre to the cell (or ghost) across a face.
    fn delta(&self, face: usize) -> Vec3 {
        let owner = self.owner()[face];
        let nif = self.n_internal_faces();
        let across = if face < nif {
            self.cell_centres()[self.neighbour()[face]]
        } else {
            self.ghost_centres()[face - nif]
        };
        across - self.cell_centres()[owner]
    }
}
