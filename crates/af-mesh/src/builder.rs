//! Incremental mesh builder.

use af_core::{CellId, FaceId, PatchId, Real, Vec3};

use crate::error::MeshResult;
use crate::mesh::{Mesh, Patch, PatchKind};
use crate::validate;

/// Cosine threshold for accepting a cell as "behind" a face in the extended stencil.
const STENCIL_ALIGNMENT: Real = 0.5;

#[derive(Debug, Clone)]
pub(crate) struct CellDef {
    pub centre: Vec3,
    pub volume: Real,
}

#[derive(Debug, Clone)]
pub(crate) struct FaceDef {
    pub owner: CellId,
    pub neighbour: Option<CellId>,
    pub centre: Vec3,
    pub area: Vec3,
}

#[derive(Debug, Clone)]
pub(crate) struct PatchDef {
    pub name: String,
    pub kind: PatchKind,
    pub faces: Vec<FaceDef>,
}

/// Builder for constructing a mesh incrementally.
///
/// Add cells, internal faces and patches with their boundary faces, then
/// call `build()` to validate and freeze everything into an immutable `Mesh`.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    pub(crate) cells: Vec<CellDef>,
    pub(crate) internal: Vec<FaceDef>,
    pub(crate) patches: Vec<PatchDef>,
    pub(crate) orphan_patch_refs: Vec<PatchId>,
}

impl MeshBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell and return its ID.
    pub fn add_cell(&mut self, centre: Vec3, volume: Real) -> CellId {
        let id = CellId::from_index(self.cells.len() as u32);
        self.cells.push(CellDef { centre, volume });
        id
    }

    /// Add an internal face. `area` must point from `owner` to `neighbour`.
    pub fn add_internal_face(
        &mut self,
        owner: CellId,
        neighbour: CellId,
        centre: Vec3,
        area: Vec3,
    ) -> FaceId {
        let id = FaceId::from_index(self.internal.len() as u32);
        self.internal.push(FaceDef {
            owner,
            neighbour: Some(neighbour),
            centre,
            area,
        });
        id
    }

    /// Declare a boundary patch.
    pub fn add_patch(&mut self, name: impl Into<String>, kind: PatchKind) -> PatchId {
        let id = PatchId::from_index(self.patches.len() as u32);
        self.patches.push(PatchDef {
            name: name.into(),
            kind,
            faces: Vec::new(),
        });
        id
    }

    /// Change a patch kind (needed to pair cyclic patches after both exist).
    pub fn set_patch_kind(&mut self, patch: PatchId, kind: PatchKind) {
        if let Some(p) = self.patches.get_mut(patch.idx()) {
            p.kind = kind;
        } else {
            self.orphan_patch_refs.push(patch);
        }
    }

    /// Add a boundary face to a patch. `area` must point out of the domain.
    pub fn add_boundary_face(&mut self, patch: PatchId, owner: CellId, centre: Vec3, area: Vec3) {
        match self.patches.get_mut(patch.idx()) {
            Some(p) => p.faces.push(FaceDef {
                owner,
                neighbour: None,
                centre,
                area,
            }),
            None => self.orphan_patch_refs.push(patch),
        }
    }

    /// Build and validate the mesh.
    pub fn build(self) -> MeshResult<Mesh> {
        validate::validate_structure(&self)?;

        let n_cells = self.cells.len();
        let n_internal = self.internal.len();

        let mut owner = Vec::new();
        let mut neighbour = Vec::with_capacity(n_internal);
        let mut area_vectors = Vec::new();
        let mut face_centres = Vec::new();
        let mut patches = Vec::with_capacity(self.patches.len());

        for face in &self.internal {
            owner.push(face.owner.idx());
            if let Some(n) = face.neighbour {
                neighbour.push(n.idx());
            }
            area_vectors.push(face.area);
            face_centres.push(face.centre);
        }
        for (i, def) in self.patches.iter().enumerate() {
            let start = owner.len();
            for face in &def.faces {
                owner.push(face.owner.idx());
                area_vectors.push(face.area);
                face_centres.push(face.centre);
            }
            patches.push(Patch {
                id: PatchId::from_index(i as u32),
                name: def.name.clone(),
                kind: def.kind,
                start,
                len: def.faces.len(),
            });
        }

        let areas: Vec<Real> = area_vectors.iter().map(|a| a.norm()).collect();
        validate::validate_faces(&areas)?;
        validate::validate_cyclic(&patches)?;

        let cell_centres: Vec<Vec3> = self.cells.iter().map(|c| c.centre).collect();
        let volumes: Vec<Real> = self.cells.iter().map(|c| c.volume).collect();

        let (cell_face_offsets, cell_faces) = Self::build_cell_faces(n_cells, &owner, &neighbour);
        let (cell_cell_offsets, cell_cells) = Self::build_cell_cells(n_cells, &owner, &neighbour);

        validate::validate_closed(
            &owner,
            &area_vectors,
            &areas,
            &cell_face_offsets,
            &cell_faces,
        )?;

        let ghost_centres = Self::build_ghost_centres(
            &patches,
            &owner,
            &cell_centres,
            &face_centres,
        );

        let n_faces = owner.len();
        let mut weights = vec![1.0; n_faces];
        for f in 0..n_faces {
            let across = if f < n_internal {
                Some(cell_centres[neighbour[f]])
            } else {
                let patch = patches.iter().find(|p| p.faces().contains(&f));
                match patch {
                    Some(p) if p.kind.is_coupled() => Some(ghost_centres[f - n_internal]),
                    _ => None,
                }
            };
            if let Some(xr) = across {
                let n = area_vectors[f] / areas[f];
                let num = n.dot(&(xr - face_centres[f]));
                let den = n.dot(&(xr - cell_centres[owner[f]]));
                weights[f] = if den > 0.0 {
                    (num / den).clamp(0.0, 1.0)
                } else {
                    0.5
                };
            }
        }

        let mut mesh = Mesh {
            volumes_old: volumes.clone(),
            cell_centres,
            volumes,
            owner,
            neighbour,
            area_vectors,
            areas,
            face_centres,
            weights,
            face_speeds: vec![0.0; n_faces],
            far_owner: Vec::new(),
            far_neighbour: Vec::new(),
            ghost_centres,
            transpiration: vec![0.0; n_faces - n_internal],
            patches,
            cell_face_offsets,
            cell_faces,
            cell_cell_offsets,
            cell_cells,
            wall_distance: vec![Real::INFINITY; n_cells],
            moved: false,
        };
        mesh.build_extended_connectivity();
        mesh.update_wall_distance();
        Ok(mesh)
    }

    /// Build compact adjacency: for each cell, its incident faces (sorted).
    fn build_cell_faces(
        n_cells: usize,
        owner: &[usize],
        neighbour: &[usize],
    ) -> (Vec<usize>, Vec<usize>) {
        let mut per_cell: Vec<Vec<usize>> = vec![Vec::new(); n_cells];
        for (f, &o) in owner.iter().enumerate() {
            per_cell[o].push(f);
        }
        for (f, &n) in neighbour.iter().enumerate() {
            per_cell[n].push(f);
        }
        Self::flatten(per_cell)
    }

    /// Build compact adjacency: for each cell, the cells across its internal faces.
    fn build_cell_cells(
        n_cells: usize,
        owner: &[usize],
        neighbour: &[usize],
    ) -> (Vec<usize>, Vec<usize>) {
        let mut per_cell: Vec<Vec<usize>> = vec![Vec::new(); n_cells];
        for (f, &n) in neighbour.iter().enumerate() {
            per_cell[owner[f]].push(n);
            per_cell[n].push(owner[f]);
        }
        Self::flatten(per_cell)
    }

    fn flatten(mut per_cell: Vec<Vec<usize>>) -> (Vec<usize>, Vec<usize>) {
        let mut offsets = Vec::with_capacity(per_cell.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);
        for list in &mut per_cell {
            list.sort_unstable();
            flat.extend_from_slice(list);
            offsets.push(flat.len());
        }
        (offsets, flat)
    }

    fn build_ghost_centres(
        patches: &[Patch],
        owner: &[usize],
        cell_centres: &[Vec3],
        face_centres: &[Vec3],
    ) -> Vec<Vec3> {
        let n_internal = owner.len() - patches.iter().map(|p| p.len).sum::<usize>();
        let mut ghost: Vec<Vec3> = face_centres[n_internal..].to_vec();
        for patch in patches {
            match patch.kind {
                PatchKind::Cyclic { partner } => {
                    let Some(partner) = patches.get(partner.idx()) else {
                        continue;
                    };
                    for (i, f) in patch.faces().enumerate() {
                        let pf = partner.start + i;
                        let shift = face_centres[f] - face_centres[pf];
                        ghost[f - n_internal] = cell_centres[owner[pf]] + shift;
                    }
                }
                PatchKind::Processor { .. } => {
                    for f in patch.faces() {
                        ghost[f - n_internal] = face_centres[f] * 2.0 - cell_centres[owner[f]];
                    }
                }
                _ => {}
            }
        }
        ghost
    }
}

impl Mesh {
    /// Find `LL` and `RR` for every face: the cell on the far side of the
    /// owner (neighbour) that lines up best with the face direction.
    pub(crate) fn build_extended_connectivity(&mut self) {
        let n_faces = self.owner.len();
        let n_internal = self.neighbour.len();
        let mut far_owner = vec![None; n_faces];
        let mut far_neighbour = vec![None; n_faces];

        for f in 0..n_faces {
            let l = self.owner[f];
            let d = crate::geometry::Geometry::delta(self, f);
            let dn = d.norm();
            if dn <= 0.0 {
                continue;
            }
            let d = d / dn;
            far_owner[f] = self.best_aligned(l, f, -d);
            if f < n_internal {
                far_neighbour[f] = self.best_aligned(self.neighbour[f], f, d);
            }
        }
        self.far_owner = far_owner;
        self.far_neighbour = far_neighbour;
    }

    fn best_aligned(&self, cell: usize, skip_face: usize, dir: Vec3) -> Option<usize> {
        let start = self.cell_face_offsets[cell];
        let end = self.cell_face_offsets[cell + 1];
        let mut best: Option<(Real, usize)> = None;
        for &g in &self.cell_faces[start..end] {
            if g == skip_face || g >= self.neighbour.len() {
                continue;
            }
            let other = if self.owner[g] == cell {
                self.neighbour[g]
            } else {
                self.owner[g]
            };
            let r = self.cell_centres[other] - self.cell_centres[cell];
            let rn = r.norm();
            if rn <= 0.0 {
                continue;
            }
            let cos = r.dot(&dir) / rn;
            if cos > STENCIL_ALIGNMENT && best.is_none_or(|(c, _)| cos > c) {
                best = Some((cos, other));
            }
        }
        best.map(|(_, c)| c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    fn two_cells() -> MeshBuilder {
        let mut b = MeshBuilder::new();
        let c0 = b.add_cell(Vec3::new(0.5, 0.5, 0.5), 1.0);
        let c1 = b.add_cell(Vec3::new(1.5, 0.5, 0.5), 1.0);
        b.add_internal_face(c0, c1, Vec3::new(1.0, 0.5, 0.5), Vec3::x());
        let left = b.add_patch("left", PatchKind::Wall);
        let right = b.add_patch("right", PatchKind::Extrapolated);
        let sides = b.add_patch("sides", PatchKind::Empty);
        b.add_boundary_face(left, c0, Vec3::new(0.0, 0.5, 0.5), -Vec3::x());
        b.add_boundary_face(right, c1, Vec3::new(2.0, 0.5, 0.5), Vec3::x());
        for (c, x) in [(c0, 0.5), (c1, 1.5)] {
            b.add_boundary_face(sides, c, Vec3::new(x, 0.0, 0.5), -Vec3::y());
            b.add_boundary_face(sides, c, Vec3::new(x, 1.0, 0.5), Vec3::y());
            b.add_boundary_face(sides, c, Vec3::new(x, 0.5, 0.0), -Vec3::z());
            b.add_boundary_face(sides, c, Vec3::new(x, 0.5, 1.0), Vec3::z());
        }
        b
    }

    #[test]
    fn builder_basic() {
        let b = two_cells();
        assert_eq!(b.cells.len(), 2);
        assert_eq!(b.internal.len(), 1);
        assert_eq!(b.patches.len(), 3);
        assert_eq!(b.patches[2].faces.len(), 8);
    }

    #[test]
    fn builder_build_orders_faces() {
        let mesh = two_cells().build().unwrap();
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.n_internal_faces(), 1);
        assert_eq!(mesh.n_faces(), 11);
        assert_eq!(mesh.patches()[0].faces(), 1..2);
        assert_eq!(mesh.patches()[2].faces(), 3..11);
        assert_eq!(mesh.cell_faces(0).len(), 6);
        assert_eq!(mesh.cell_neighbours(0), &[1]);
        assert!((mesh.weights()[0] - 0.5).abs() < 1e-15);
    }

    #[test]
    fn builder_rejects_open_cell() {
        let mut b = two_cells();
        b.patches[1].faces.clear();
        assert!(b.build().is_err());
    }
}
