//! Green-Gauss cell gradients.

use af_core::{FieldValue, Real};

use crate::geometry::Geometry;

/// Linear face interpolation `φ_R + w (φ_L − φ_R)`; exact for uniform fields.
#[inline]
pub fn face_interpolate<T: FieldValue>(w: Real, left: T, right: T) -> T {
    right + (left - right) * w
}

/// Cell gradients `∇φ = (1/V) Σ_f S_f ⊗ φ_f`.
///
/// `boundary` holds the face value on every boundary face, usually produced
/// by [`crate::correct_boundary_conditions`].
pub fn green_gauss<G, T>(mesh: &G, cells: &[T], boundary: &[T]) -> Vec<T::Gradient>
where
    G: Geometry + ?Sized,
    T: FieldValue,
{
    let nif = mesh.n_internal_faces();
    let owner = mesh.owner();
    let neighbour = mesh.neighbour();
    let sf = mesh.area_vectors();
    let w = mesh.weights();

    let mut grad = vec![T::zero_gradient(); mesh.n_cells()];
    for f in 0..nif {
        let (l, r) = (owner[f], neighbour[f]);
        let phi = face_interpolate(w[f], cells[l], cells[r]);
        let flux = phi.outer(&sf[f]);
        grad[l] += flux;
        grad[r] -= flux;
    }
    for f in nif..mesh.n_faces() {
        grad[owner[f]] += boundary[f - nif].outer(&sf[f]);
    }
    for (g, v) in grad.iter_mut().zip(mesh.volumes()) {
        *g = *g * (1.0 / v);
    }
    grad
}
