//! Cell-field value types.
//!
//! Operators over the mesh (gradients, smoothing, halo snapshots, dual-time
//! baselines) are written once over [`FieldValue`] and used for scalar and
//! vector fields alike.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use nalgebra::{Matrix3, Vector3};

use crate::numeric::Real;

pub type Vec3 = Vector3<Real>;

/// Second-order tensor. Gradients store `g[(i, j)] = ∂φ_j/∂x_i`.
pub type Tensor = Matrix3<Real>;

/// Value stored per cell in a field.
pub trait FieldValue:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<Real, Output = Self>
    + AddAssign
    + SubAssign
{
    /// Gradient type: `Vec3` for scalars, `Tensor` for vectors.
    type Gradient: Copy
        + Debug
        + PartialEq
        + Add<Output = Self::Gradient>
        + Sub<Output = Self::Gradient>
        + Mul<Real, Output = Self::Gradient>
        + AddAssign
        + SubAssign;

    const COMPONENTS: usize;

    fn zero() -> Self;

    fn zero_gradient() -> Self::Gradient;

    fn mag_sqr(&self) -> Real;

    fn component(&self, i: usize) -> Real;

    /// Rebuild a value from `COMPONENTS` reals.
    fn from_components(c: &[Real]) -> Self;

    /// Surface-vector outer product `S ⊗ φ`, the Green-Gauss face term.
    fn outer(self, sf: &Vec3) -> Self::Gradient;

    /// Directional derivative `(d · ∇)φ` of a gradient.
    fn along(grad: &Self::Gradient, d: &Vec3) -> Self;
}

impl FieldValue for Real {
    type Gradient = Vec3;

    const COMPONENTS: usize = 1;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn zero_gradient() -> Vec3 {
        Vec3::zeros()
    }

    #[inline]
    fn mag_sqr(&self) -> Real {
        self * self
    }

    #[inline]
    fn component(&self, _i: usize) -> Real {
        *self
    }

    #[inline]
    fn from_components(c: &[Real]) -> Self {
        c[0]
    }

    #[inline]
    fn outer(self, sf: &Vec3) -> Vec3 {
        sf * self
    }

    #[inline]
    fn along(grad: &Vec3, d: &Vec3) -> Self {
        grad.dot(d)
    }
}

impl FieldValue for Vec3 {
    type Gradient = Tensor;

    const COMPONENTS: usize = 3;

    #[inline]
    fn zero() -> Self {
        Vec3::zeros()
    }

    #[inline]
    fn zero_gradient() -> Tensor {
        Tensor::zeros()
    }

    #[inline]
    fn mag_sqr(&self) -> Real {
        self.norm_squared()
    }

    #[inline]
    fn component(&self, i: usize) -> Real {
        self[i]
    }

    #[inline]
    fn from_components(c: &[Real]) -> Self {
        Vec3::new(c[0], c[1], c[2])
    }

    #[inline]
    fn outer(self, sf: &Vec3) -> Tensor {
        sf * self.transpose()
    }

    #[inline]
    fn along(grad: &Tensor, d: &Vec3) -> Self {
        grad.transpose() * d
    }
}

/// Symmetric part of a velocity gradient, `½(∇U + ∇Uᵀ)`.
pub fn symm(grad: &Tensor) -> Tensor {
    (grad + grad.transpose()) * 0.5
}

/// Double inner product `A : B`.
pub fn ddot(a: &Tensor, b: &Tensor) -> Real {
    a.component_mul(b).sum()
}
