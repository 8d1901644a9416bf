//! Slope limiters and MUSCL face reconstruction.
//!
//! Reconstruction works on the one-dimensional stencil `LL | L |-> R | RR`
//! threaded through each face. Limiters take the two one-sided differences
//! and return the limited slope; opposite signs give zero, so reconstructed
//! values always stay between neighbouring cell values.

use af_core::{FieldValue, Real};

/// Symmetric TVD limiter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Limiter {
    #[default]
    MinMod,
    VanLeer,
    VanAlbada,
}

impl Limiter {
    /// Limited slope from the backward and forward differences `a`, `b`.
    #[inline]
    pub fn slope(self, a: Real, b: Real) -> Real {
        let ab = a * b;
        if ab <= 0.0 {
            return 0.0;
        }
        match self {
            Limiter::MinMod => {
                if a.abs() < b.abs() {
                    a
                } else {
                    b
                }
            }
            Limiter::VanLeer => 2.0 * ab / (a + b),
            Limiter::VanAlbada => ab * (a + b) / (a * a + b * b),
        }
    }

    /// Component-wise slope for any field value.
    pub fn slope_of<T: FieldValue>(self, a: T, b: T) -> T {
        let mut c = [0.0; 3];
        for (i, ci) in c.iter_mut().enumerate().take(T::COMPONENTS) {
            *ci = self.slope(a.component(i), b.component(i));
        }
        T::from_components(&c[..T::COMPONENTS])
    }

    /// Left face value `φ_L + ½ ψ(φ_L − φ_LL, φ_R − φ_L)`.
    pub fn left<T: FieldValue>(self, ll: T, l: T, r: T) -> T {
        l + self.slope_of(l - ll, r - l) * 0.5
    }

    /// Right face value `φ_R − ½ ψ(φ_RR − φ_R, φ_R − φ_L)`.
    pub fn right<T: FieldValue>(self, l: T, r: T, rr: T) -> T {
        r - self.slope_of(rr - r, r - l) * 0.5
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn face_values_are_bounded(
            ll in -10.0f64..10.0,
            l in -10.0f64..10.0,
            r in -10.0f64..10.0,
            rr in -10.0f64..10.0,
        ) {
            for lim in [Limiter::MinMod, Limiter::VanLeer, Limiter::VanAlbada] {
                let left = lim.left(ll, l, r);
                let right = lim.right(l, r, rr);
                let (lo, hi) = (l.min(r) - 1e-12, l.max(r) + 1e-12);
                prop_assert!(left >= lo.min(l) && left <= hi.max(l));
                prop_assert!(right >= lo.min(r) && right <= hi.max(r));
            }
        }
    }
}
