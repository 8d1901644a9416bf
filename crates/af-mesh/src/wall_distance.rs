//! Nearest-wall distance.

use af_core::Real;
use tracing::debug;

use crate::mesh::{Mesh, PatchKind};

impl Mesh {
    /// Recompute the distance from every cell centre to the nearest wall face.
    ///
    /// The distance is measured to the wall face plane when the cell centre
    /// projects inside the face, otherwise to the face centre. Without wall
    /// patches every distance is infinite, which switches off near-wall terms.
    pub fn update_wall_distance(&mut self) {
        let wall_faces: Vec<usize> = self
            .patches
            .iter()
            .filter(|p| p.kind == PatchKind::Wall)
            .flat_map(|p| p.faces())
            .collect();

        for (cell, xc) in self.cell_centres.iter().enumerate() {
            let mut best = Real::INFINITY;
            for &f in &wall_faces {
                let n = self.area_vectors[f] / self.areas[f];
                let r = xc - self.face_centres[f];
                let normal = r.dot(&n).abs();
                let lateral = (r - n * r.dot(&n)).norm_squared();
                // Treat the face as a disc of equal area for the projection test.
                let radius_sqr = self.areas[f] / core::f64::consts::PI;
                let d = if lateral <= radius_sqr {
                    normal
                } else {
                    r.norm()
                };
                best = best.min(d);
            }
            self.wall_distance[cell] = best;
        }
        debug!(
            walls = wall_faces.len(),
            cells = self.cell_centres.len(),
            "wall distance updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::generate::CartesianSpec;
    use crate::geometry::Geometry;
    use crate::mesh::{Mesh, PatchKind};
    use af_core::Vec3;

    #[test]
    fn channel_wall_distance() {
        let spec = CartesianSpec::new([4, 4, 1], Vec3::new(4.0, 4.0, 1.0)).with_kinds([
            PatchKind::FarField,
            PatchKind::FarField,
            PatchKind::Wall,
            PatchKind::FarField,
            PatchKind::Empty,
            PatchKind::Empty,
        ]);
        let mesh = Mesh::cartesian(&spec).unwrap();
        for (cell, xc) in mesh.cell_centres().iter().enumerate() {
            assert!((mesh.wall_distance()[cell] - xc.y).abs() < 1e-12);
        }
    }

    #[test]
    fn no_walls_is_infinite() {
        let mesh = Mesh::strip(3, 1.0, PatchKind::FarField, PatchKind::FarField).unwrap();
        assert!(mesh.wall_distance().iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn switching_patch_to_wall_updates_distance() {
        let mut mesh = Mesh::strip(4, 1.0, PatchKind::FarField, PatchKind::FarField).unwrap();
        mesh.set_patch_kind("xmin", PatchKind::Wall).unwrap();
        assert!((mesh.wall_distance()[0] - 0.125).abs() < 1e-12);
        assert!((mesh.wall_distance()[3] - 0.875).abs() < 1e-12);
    }
}
