//! Mesh motion: ALE kinematics and transpiration.
//!
//! `advance` moves the mesh over one physical step, keeping the previous
//! volumes and setting face normal speeds so that the swept volume of every
//! cell matches its change in volume. Transpiration instead emulates motion
//! of a wall patch through a prescribed normal velocity on a fixed mesh.

use af_core::{PatchId, Real, Vec3};
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{Mesh, PatchKind};

/// Prescribed motion of the whole mesh over one physical step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshMotion {
    /// Rigid translation at constant velocity.
    Translation { velocity: Vec3 },
    /// Uniform stretch along `axis` about `origin`: positions scale by
    /// `1 + rate·dt` per step.
    Stretch { axis: usize, origin: Real, rate: Real },
}

impl Mesh {
    /// Move the mesh by one physical step of length `dt`.
    pub fn advance(&mut self, motion: &MeshMotion, dt: Real) -> MeshResult<()> {
        af_core::ensure_positive(dt, "motion time step")?;
        self.volumes_old.copy_from_slice(&self.volumes);

        match *motion {
            MeshMotion::Translation { velocity } => {
                for f in 0..self.owner.len() {
                    let n = self.area_vectors[f] / self.areas[f];
                    self.face_speeds[f] = velocity.dot(&n);
                }
                let shift = velocity * dt;
                for x in &mut self.cell_centres {
                    *x += shift;
                }
                for x in &mut self.face_centres {
                    *x += shift;
                }
                for x in &mut self.ghost_centres {
                    *x += shift;
                }
            }
            MeshMotion::Stretch { axis, origin, rate } => {
                if axis > 2 {
                    return Err(MeshError::InvalidArg {
                        what: "stretch axis must be 0, 1 or 2",
                    });
                }
                let factor = 1.0 + rate * dt;
                if !(factor.is_finite() && factor > 0.0) {
                    return Err(MeshError::InvalidArg {
                        what: "stretch collapses the mesh",
                    });
                }
                // Face speeds use the positions at the start of the step.
                for f in 0..self.owner.len() {
                    let v = rate * (self.face_centres[f][axis] - origin);
                    self.face_speeds[f] = v * self.area_vectors[f][axis] / self.areas[f];
                }
                let map = |x: &mut Vec3| x[axis] = origin + factor * (x[axis] - origin);
                self.cell_centres.iter_mut().for_each(map);
                self.face_centres.iter_mut().for_each(map);
                self.ghost_centres.iter_mut().for_each(map);
                for (f, s) in self.area_vectors.iter_mut().enumerate() {
                    for a in 0..3 {
                        if a != axis {
                            s[a] *= factor;
                        }
                    }
                    self.areas[f] = s.norm();
                }
                for v in &mut self.volumes {
                    *v *= factor;
                }
            }
        }

        self.moved = true;
        self.update_wall_distance();
        debug!(?motion, dt, "mesh advanced");
        Ok(())
    }

    /// Stop the mesh: face speeds drop to zero and old volumes catch up.
    pub fn freeze(&mut self) {
        self.face_speeds.iter_mut().for_each(|v| *v = 0.0);
        self.volumes_old.copy_from_slice(&self.volumes);
    }

    /// Prescribe a uniform transpiration normal velocity on a wall patch.
    pub fn set_transpiration(&mut self, patch: PatchId, normal_velocity: Real) -> MeshResult<()> {
        let n_internal = self.neighbour.len();
        let p = self
            .patches
            .get(patch.idx())
            .ok_or(MeshError::InvalidPatchRef { patch })?;
        if p.kind != PatchKind::Wall {
            return Err(MeshError::InvalidArg {
                what: "transpiration applies to wall patches",
            });
        }
        for f in p.faces() {
            self.transpiration[f - n_internal] = normal_velocity;
        }
        Ok(())
    }

    /// Emulate rigid motion of a wall patch with velocity `body_velocity`
    /// by transpiration, without moving the mesh.
    pub fn emulate_motion(&mut self, patch: PatchId, body_velocity: Vec3) -> MeshResult<()> {
        let n_internal = self.neighbour.len();
        let p = self
            .patches
            .get(patch.idx())
            .ok_or(MeshError::InvalidPatchRef { patch })?;
        if p.kind != PatchKind::Wall {
            return Err(MeshError::InvalidArg {
                what: "transpiration applies to wall patches",
            });
        }
        for f in p.faces() {
            let n = self.area_vectors[f] / self.areas[f];
            self.transpiration[f - n_internal] = body_velocity.dot(&n);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::CartesianSpec;
    use crate::geometry::Geometry;

    fn swept_rate(mesh: &Mesh, cell: usize) -> Real {
        mesh.cell_faces(cell)
            .iter()
            .map(|&f| {
                let s = mesh.face_speeds()[f] * mesh.areas()[f];
                if mesh.owner()[f] == cell { s } else { -s }
            })
            .sum()
    }

    #[test]
    fn translation_keeps_volumes() {
        let mut mesh = Mesh::strip(4, 1.0, PatchKind::Wall, PatchKind::Wall).unwrap();
        let x0 = mesh.cell_centres()[0];
        mesh.advance(
            &MeshMotion::Translation {
                velocity: Vec3::new(2.0, 0.0, 0.0),
            },
            0.1,
        )
        .unwrap();
        assert!(mesh.has_moved());
        assert!((mesh.cell_centres()[0].x - x0.x - 0.2).abs() < 1e-14);
        assert_eq!(mesh.volumes(), mesh.volumes_old());
        for c in 0..mesh.n_cells() {
            assert!(swept_rate(&mesh, c).abs() < 1e-12);
        }
        mesh.acknowledge_motion();
        assert!(!mesh.has_moved());
    }

    #[test]
    fn stretch_satisfies_geometric_conservation() {
        let spec = CartesianSpec::new([3, 2, 1], Vec3::new(3.0, 2.0, 1.0));
        let mut mesh = Mesh::cartesian(&spec).unwrap();
        let dt = 0.01;
        mesh.advance(
            &MeshMotion::Stretch {
                axis: 0,
                origin: 0.0,
                rate: 0.5,
            },
            dt,
        )
        .unwrap();
        for c in 0..mesh.n_cells() {
            let dv = (mesh.volumes()[c] - mesh.volumes_old()[c]) / dt;
            assert!((dv - swept_rate(&mesh, c)).abs() < 1e-12);
        }
    }

    #[test]
    fn transpiration_requires_wall() {
        let mut mesh = Mesh::strip(2, 1.0, PatchKind::Wall, PatchKind::FarField).unwrap();
        let wall = mesh.patch_id("xmin").unwrap();
        let far = mesh.patch_id("xmax").unwrap();
        mesh.emulate_motion(wall, Vec3::new(-3.0, 0.0, 0.0)).unwrap();
        let f = mesh.patch(wall).unwrap().start() - mesh.n_internal_faces();
        // outward normal of xmin is -x
        assert!((mesh.transpiration()[f] - 3.0).abs() < 1e-14);
        assert!(mesh.set_transpiration(far, 1.0).is_err());
    }
}
