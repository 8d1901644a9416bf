//! Strain-rate and vorticity magnitudes of the mean-flow velocity gradient.

use af_core::{Real, Tensor, ddot, symm};

/// Antisymmetric part `½(∇U − ∇Uᵀ)`.
pub fn skew(grad: &Tensor) -> Tensor {
    (grad - grad.transpose()) * 0.5
}

/// `|S| = √(2 S:S)`.
pub fn strain_rate(grad: &Tensor) -> Real {
    let s = symm(grad);
    (2.0 * ddot(&s, &s)).sqrt()
}

/// `Ω = √(2 W:W)`.
pub fn vorticity(grad: &Tensor) -> Real {
    let w = skew(grad);
    (2.0 * ddot(&w, &w)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_shear() {
        // u_x = γ y gives |S| = Ω = γ
        let mut g = Tensor::zeros();
        g[(1, 0)] = 3.0;
        assert!((strain_rate(&g) - 3.0).abs() < 1e-14);
        assert!((vorticity(&g) - 3.0).abs() < 1e-14);
    }

    #[test]
    fn solid_rotation_has_no_strain() {
        let mut g = Tensor::zeros();
        g[(1, 0)] = -2.0;
        g[(0, 1)] = 2.0;
        assert_eq!(strain_rate(&g), 0.0);
        assert!((vorticity(&g) - 4.0).abs() < 1e-14);
    }

    #[test]
    fn uniform_flow_is_zero() {
        assert_eq!(strain_rate(&Tensor::zeros()), 0.0);
        assert_eq!(vorticity(&Tensor::zeros()), 0.0);
    }
}
