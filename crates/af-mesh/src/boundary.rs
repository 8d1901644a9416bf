//! Patch-rule boundary correction.
//!
//! Fields own their cell values; boundary face values are derived from them
//! through the patch rules every time the cell values change.

use af_core::FieldValue;

use crate::geometry::Geometry;
use crate::gradient::face_interpolate;
use crate::halo::HaloField;
use crate::mesh::Patch;

/// How a non-coupled patch sets a boundary face value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryRule<T> {
    /// Copy the owner value.
    ZeroGradient,
    /// Prescribed value.
    Fixed(T),
}

/// Face values on every boundary face.
///
/// Coupled patches interpolate between the owner and the halo value across
/// the face; every other patch asks `rule(patch, face, owner_value)`.
pub fn correct_boundary_conditions<G, T, F>(
    mesh: &G,
    cells: &[T],
    halo: &HaloField<T>,
    mut rule: F,
) -> Vec<T>
where
    G: Geometry + ?Sized,
    T: FieldValue,
    F: FnMut(&Patch, usize, T) -> BoundaryRule<T>,
{
    let nif = mesh.n_internal_faces();
    let owner = mesh.owner();
    let w = mesh.weights();
    let mut values: Vec<T> = (nif..mesh.n_faces()).map(|f| cells[owner[f]]).collect();

    for patch in mesh.patches() {
        for f in patch.faces() {
            let b = f - nif;
            let inside = cells[owner[f]];
            values[b] = if patch.kind.is_coupled() {
                face_interpolate(w[f], inside, halo.near(b))
            } else {
                match rule(patch, f, inside) {
                    BoundaryRule::ZeroGradient => inside,
                    BoundaryRule::Fixed(v) => v,
                }
            };
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Mesh, PatchKind};

    #[test]
    fn rules_per_patch() {
        let mesh = Mesh::strip(3, 3.0, PatchKind::Wall, PatchKind::Extrapolated).unwrap();
        let cells = vec![1.0, 2.0, 3.0];
        let halo = HaloField::local(&mesh, &cells);
        let values = correct_boundary_conditions(&mesh, &cells, &halo, |p, _, _| match p.kind {
            PatchKind::Wall => BoundaryRule::Fixed(0.0),
            _ => BoundaryRule::ZeroGradient,
        });
        let nif = mesh.n_internal_faces();
        let xmin = mesh.patch(mesh.patch_id("xmin").unwrap()).unwrap().start();
        let xmax = mesh.patch(mesh.patch_id("xmax").unwrap()).unwrap().start();
        assert_eq!(values[xmin - nif], 0.0);
        assert_eq!(values[xmax - nif], 3.0);
    }
}
