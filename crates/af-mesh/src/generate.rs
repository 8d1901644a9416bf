//! Structured mesh generators.

use af_core::{CellId, Real, Vec3};

use crate::builder::MeshBuilder;
use crate::error::{MeshError, MeshResult};
use crate::mesh::{Mesh, PatchKind};

/// Patch names created by [`Mesh::cartesian`], in patch-id order.
pub const CARTESIAN_PATCHES: [&str; 6] = ["xmin", "xmax", "ymin", "ymax", "zmin", "zmax"];

/// Axis-aligned box split into `cells[0] × cells[1] × cells[2]` hexahedra.
#[derive(Debug, Clone)]
pub struct CartesianSpec {
    pub cells: [usize; 3],
    pub origin: Vec3,
    pub lengths: Vec3,
    /// Kinds for `xmin, xmax, ymin, ymax, zmin, zmax`. A cyclic pair refers
    /// to its partner by position in this array.
    pub kinds: [PatchKind; 6],
}

impl CartesianSpec {
    /// Box at the origin with zero-gradient boundaries everywhere.
    pub fn new(cells: [usize; 3], lengths: Vec3) -> Self {
        Self {
            cells,
            origin: Vec3::zeros(),
            lengths,
            kinds: [PatchKind::Extrapolated; 6],
        }
    }

    pub fn with_kinds(mut self, kinds: [PatchKind; 6]) -> Self {
        self.kinds = kinds;
        self
    }
}

impl Mesh {
    /// Build a Cartesian box mesh.
    pub fn cartesian(spec: &CartesianSpec) -> MeshResult<Mesh> {
        let [nx, ny, nz] = spec.cells;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(MeshError::InvalidArg {
                what: "cartesian cell counts must be positive",
            });
        }
        for &l in spec.lengths.iter() {
            af_core::ensure_positive(l, "cartesian box length")?;
        }
        let h = Vec3::new(
            spec.lengths.x / nx as Real,
            spec.lengths.y / ny as Real,
            spec.lengths.z / nz as Real,
        );
        let volume = h.x * h.y * h.z;
        let face_area = [h.y * h.z, h.x * h.z, h.x * h.y];
        let o = spec.origin;
        let idx = |i: usize, j: usize, k: usize| CellId::from_index((i + nx * (j + ny * k)) as u32);
        let centre = |i: usize, j: usize, k: usize| {
            o + Vec3::new(
                (i as Real + 0.5) * h.x,
                (j as Real + 0.5) * h.y,
                (k as Real + 0.5) * h.z,
            )
        };

        let mut b = MeshBuilder::new();
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    b.add_cell(centre(i, j, k), volume);
                }
            }
        }

        let unit = [Vec3::x(), Vec3::y(), Vec3::z()];
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = centre(i, j, k);
                    let here = idx(i, j, k);
                    let next = [
                        (i + 1 < nx).then(|| idx(i + 1, j, k)),
                        (j + 1 < ny).then(|| idx(i, j + 1, k)),
                        (k + 1 < nz).then(|| idx(i, j, k + 1)),
                    ];
                    for axis in 0..3 {
                        if let Some(n) = next[axis] {
                            let fc = c + unit[axis] * (0.5 * h[axis]);
                            b.add_internal_face(here, n, fc, unit[axis] * face_area[axis]);
                        }
                    }
                }
            }
        }

        let patch_ids: Vec<_> = CARTESIAN_PATCHES
            .iter()
            .zip(spec.kinds.iter())
            .map(|(name, &kind)| b.add_patch(*name, kind))
            .collect();

        let counts = [nx, ny, nz];
        for axis in 0..3 {
            let (a1, a2) = ((axis + 1) % 3, (axis + 2) % 3);
            for side in 0..2 {
                let patch = patch_ids[2 * axis + side];
                let layer = if side == 0 { 0 } else { counts[axis] - 1 };
                let sign = if side == 0 { -1.0 } else { 1.0 };
                // Faces ordered identically on both sides so cyclic pairs line up.
                for q in 0..counts[a2] {
                    for p in 0..counts[a1] {
                        let mut ijk = [0usize; 3];
                        ijk[axis] = layer;
                        ijk[a1] = p;
                        ijk[a2] = q;
                        let (i, j, k) = (ijk[0], ijk[1], ijk[2]);
                        let fc = centre(i, j, k) + unit[axis] * (sign * 0.5 * h[axis]);
                        b.add_boundary_face(
                            patch,
                            idx(i, j, k),
                            fc,
                            unit[axis] * (sign * face_area[axis]),
                        );
                    }
                }
            }
        }

        b.build()
    }

    /// One-dimensional strip of `n` cells on `[0, length]` along x with unit
    /// cross-section. The ends are `xmin`/`xmax`; all side patches are empty.
    pub fn strip(n: usize, length: Real, left: PatchKind, right: PatchKind) -> MeshResult<Mesh> {
        let spec = CartesianSpec::new([n, 1, 1], Vec3::new(length, 1.0, 1.0)).with_kinds([
            left,
            right,
            PatchKind::Empty,
            PatchKind::Empty,
            PatchKind::Empty,
            PatchKind::Empty,
        ]);
        Mesh::cartesian(&spec)
    }
}
