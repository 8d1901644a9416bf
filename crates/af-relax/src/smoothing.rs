//! Implicit residual smoothing.
//!
//! Solves `(1 + ε nᵢ) R̄ᵢ − ε Σⱼ R̄ⱼ = Rᵢ` approximately with a few Jacobi
//! sweeps, where `j` runs over the face neighbours of cell `i`. This is a
//! Laplacian filter on the rhs array, not a solve of the flow Jacobian.

use af_core::{FieldValue, Real};
use af_mesh::Geometry;

use crate::error::{RelaxError, RelaxResult};

/// Smoothing sweeps and coefficient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothingOptions {
    pub iterations: usize,
    /// Coefficient in `[0, 1)`.
    pub epsilon: Real,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            iterations: 0,
            epsilon: 0.0,
        }
    }
}

impl SmoothingOptions {
    pub fn validate(&self) -> RelaxResult<()> {
        if !(self.epsilon.is_finite() && (0.0..1.0).contains(&self.epsilon)) {
            return Err(RelaxError::InvalidArg {
                what: "smoothing epsilon must lie in [0, 1)",
            });
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.iterations > 0 && self.epsilon != 0.0
    }
}

/// Smooth `rhs` in place. With no sweeps or `epsilon == 0` the array is untouched.
pub fn smooth_rhs<G, T>(mesh: &G, rhs: &mut [T], iterations: usize, epsilon: Real)
where
    G: Geometry + ?Sized,
    T: FieldValue,
{
    if iterations == 0 || epsilon == 0.0 {
        return;
    }
    let source = rhs.to_vec();
    let mut next = source.clone();
    for _ in 0..iterations {
        for (i, out) in next.iter_mut().enumerate() {
            let neighbours = mesh.cell_neighbours(i);
            let mut sum = T::zero();
            for &j in neighbours {
                sum += rhs[j];
            }
            let diag = 1.0 + epsilon * neighbours.len() as Real;
            *out = (source[i] + sum * epsilon) * (1.0 / diag);
        }
        rhs.copy_from_slice(&next);
    }
}
