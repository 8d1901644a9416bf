//! Strain-rate helpers used by the turbulence closures.

use af_core::{Tensor, ddot, symm};
use proptest::prelude::*;

fn tensors() -> impl Strategy<Value = Tensor> {
    prop::collection::vec(-100.0f64..100.0, 9).prop_map(|v| Tensor::from_row_slice(&v))
}

proptest! {
    #[test]
    fn symmetric_part_is_symmetric(g in tensors()) {
        let s = symm(&g);
        prop_assert_eq!(s, s.transpose());
    }

    #[test]
    fn strain_magnitude_is_non_negative(g in tensors()) {
        let s = symm(&g);
        prop_assert!(ddot(&s, &s) >= 0.0);
    }

    #[test]
    fn antisymmetric_part_is_orthogonal_to_strain(g in tensors()) {
        let s = symm(&g);
        let w = (g - g.transpose()) * 0.5;
        let scale = ddot(&g, &g) + 1.0;
        prop_assert!(ddot(&s, &w).abs() <= 1e-12 * scale);
    }
}
