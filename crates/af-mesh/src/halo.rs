//! Halo snapshots for coupled boundary faces.
//!
//! A `HaloField` is built right before a flux pass and dropped after it. For
//! every boundary face it holds the value in the cell across the face
//! (`near`, the `R` of the stencil) and the one behind that (`far`, `RR`).
//! Cyclic patches are filled from the partner patch on this partition;
//! processor patches go through the communicator. Non-coupled faces hold
//! the owner value in both slots.

use af_core::{FieldValue, Real};

use crate::geometry::Geometry;
use crate::mesh::PatchKind;
use crate::parallel::Communicator;

/// Immutable neighbour-side values per boundary face.
#[derive(Debug, Clone, PartialEq)]
pub struct HaloField<T> {
    near: Vec<T>,
    far: Vec<T>,
}

impl<T: FieldValue> HaloField<T> {
    /// Take a snapshot of `cells` across every coupled patch.
    pub fn exchange<G, C>(mesh: &G, comm: &C, cells: &[T]) -> Self
    where
        G: Geometry + ?Sized,
        C: Communicator + ?Sized,
    {
        let nif = mesh.n_internal_faces();
        let owner = mesh.owner();
        let far_owner = mesh.far_owner();
        let behind = |f: usize| far_owner[f].map_or(cells[owner[f]], |c| cells[c]);

        let mut near: Vec<T> = (nif..mesh.n_faces()).map(|f| cells[owner[f]]).collect();
        let mut far = near.clone();

        for patch in mesh.patches() {
            match patch.kind {
                PatchKind::Cyclic { partner } => {
                    let Some(partner) = mesh.patches().get(partner.idx()) else {
                        continue;
                    };
                    for (i, f) in patch.faces().enumerate() {
                        let pf = partner.start() + i;
                        near[f - nif] = cells[owner[pf]];
                        far[f - nif] = behind(pf);
                    }
                }
                PatchKind::Processor { neighbour_rank } => {
                    let mut send = Vec::with_capacity(2 * patch.len() * T::COMPONENTS);
                    for f in patch.faces() {
                        push_components(&mut send, cells[owner[f]]);
                        push_components(&mut send, behind(f));
                    }
                    let recv = comm.exchange(neighbour_rank, &send);
                    let stride = 2 * T::COMPONENTS;
                    for (i, f) in patch.faces().enumerate() {
                        let base = i * stride;
                        if recv.len() < base + stride {
                            break;
                        }
                        near[f - nif] = T::from_components(&recv[base..base + T::COMPONENTS]);
                        far[f - nif] =
                            T::from_components(&recv[base + T::COMPONENTS..base + stride]);
                    }
                }
                _ => {}
            }
        }

        Self { near, far }
    }

    /// Snapshot with no coupled patches: owner values everywhere.
    pub fn local<G: Geometry + ?Sized>(mesh: &G, cells: &[T]) -> Self {
        let nif = mesh.n_internal_faces();
        let near: Vec<T> = (nif..mesh.n_faces()).map(|f| cells[mesh.owner()[f]]).collect();
        Self {
            far: near.clone(),
            near,
        }
    }

    /// Value across boundary face `b` (index relative to the first boundary face).
    pub fn near(&self, b: usize) -> T {
        self.near[b]
    }

    /// Value one cell further across boundary face `b`.
    pub fn far(&self, b: usize) -> T {
        self.far[b]
    }

    pub fn len(&self) -> usize {
        self.near.len()
    }

    pub fn is_empty(&self) -> bool {
        self.near.is_empty()
    }
}

fn push_components<T: FieldValue>(buf: &mut Vec<Real>, v: T) {
    for i in 0..T::COMPONENTS {
        buf.push(v.component(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::CartesianSpec;
    use crate::mesh::{Mesh, PatchKind};
    use crate::parallel::SerialComm;
    use af_core::{PatchId, Vec3};

    fn periodic_strip(n: usize) -> Mesh {
        let spec = CartesianSpec::new([n, 1, 1], Vec3::new(n as f64, 1.0, 1.0)).with_kinds([
            PatchKind::Cyclic {
                partner: PatchId::from_index(1),
            },
            PatchKind::Cyclic {
                partner: PatchId::from_index(0),
            },
            PatchKind::Empty,
            PatchKind::Empty,
            PatchKind::Empty,
            PatchKind::Empty,
        ]);
        Mesh::cartesian(&spec).unwrap()
    }

    #[test]
    fn cyclic_halo_wraps_around() {
        let mesh = periodic_strip(4);
        let cells = vec![1.0, 2.0, 3.0, 4.0];
        let halo = HaloField::exchange(&mesh, &SerialComm, &cells);
        let nif = mesh.n_internal_faces();
        let xmin = mesh.patch_id("xmin").unwrap();
        let xmax = mesh.patch_id("xmax").unwrap();
        let bmin = mesh.patch(xmin).unwrap().start() - nif;
        let bmax = mesh.patch(xmax).unwrap().start() - nif;
        assert_eq!(halo.near(bmin), 4.0);
        assert_eq!(halo.far(bmin), 3.0);
        assert_eq!(halo.near(bmax), 1.0);
        assert_eq!(halo.far(bmax), 2.0);
    }

    #[test]
    fn cyclic_ghost_centre_is_translated_partner() {
        let mesh = periodic_strip(4);
        let nif = mesh.n_internal_faces();
        let xmin = mesh.patch_id("xmin").unwrap();
        let b = mesh.patch(xmin).unwrap().start() - nif;
        assert!((mesh.ghost_centres()[b].x + 0.5).abs() < 1e-12);
    }

    #[test]
    fn vector_halo_round_trips_components() {
        let spec = CartesianSpec::new([2, 1, 1], Vec3::new(2.0, 1.0, 1.0)).with_kinds([
            PatchKind::Processor { neighbour_rank: 0 },
            PatchKind::Extrapolated,
            PatchKind::Empty,
            PatchKind::Empty,
            PatchKind::Empty,
            PatchKind::Empty,
        ]);
        let mesh = Mesh::cartesian(&spec).unwrap();
        let cells = vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)];
        let halo = HaloField::exchange(&mesh, &SerialComm, &cells);
        // loopback: the processor face sees its own owner and the cell behind it
        let b = mesh.patch(mesh.patch_id("xmin").unwrap()).unwrap().start() - mesh.n_internal_faces();
        assert_eq!(halo.near(b), cells[0]);
        assert_eq!(halo.far(b), cells[1]);
    }
}
