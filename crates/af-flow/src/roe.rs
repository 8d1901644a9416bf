//! Roe approximate Riemann solver for the 3-D Euler fluxes.
//!
//! ```text
//! F* = ½ (F_L + F_R) − ½ Σ |λ_k| α_k r_k
//! ```
//!
//! with Roe-averaged eigenvalues `λ`, wave strengths `α` and right
//! eigenvectors `r`. Face velocities (ALE) shift the eigenvalues and the
//! convected volume flux but not the eigenvectors.
//!
//! Reference: Toro, "Riemann Solvers and Numerical Methods for Fluid Dynamics", ch. 11.

use core::ops::{Add, Mul, Sub};

use af_core::{Real, Vec3};

use crate::options::EntropyFix;

/// Fluxes of mass, momentum and total energy through a face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flux {
    pub rho: Real,
    pub m: Vec3,
    pub et: Real,
}

impl Flux {
    pub fn zero() -> Self {
        Self {
            rho: 0.0,
            m: Vec3::zeros(),
            et: 0.0,
        }
    }
}

impl Add for Flux {
    type Output = Flux;
    fn add(self, o: Flux) -> Flux {
        Flux {
            rho: self.rho + o.rho,
            m: self.m + o.m,
            et: self.et + o.et,
        }
    }
}

impl Sub for Flux {
    type Output = Flux;
    fn sub(self, o: Flux) -> Flux {
        Flux {
            rho: self.rho - o.rho,
            m: self.m - o.m,
            et: self.et - o.et,
        }
    }
}

impl Mul<Real> for Flux {
    type Output = Flux;
    fn mul(self, s: Real) -> Flux {
        Flux {
            rho: self.rho * s,
            m: self.m * s,
            et: self.et * s,
        }
    }
}

/// One side of a face: density, velocity, pressure and specific total enthalpy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceState {
    pub rho: Real,
    pub u: Vec3,
    pub p: Real,
    pub h: Real,
}

impl FaceState {
    /// Face state of a calorically perfect gas.
    pub fn new(rho: Real, u: Vec3, p: Real, gamma: Real) -> Self {
        let h = gamma / (gamma - 1.0) * p / rho + 0.5 * u.norm_squared();
        Self { rho, u, p, h }
    }

    /// Physical flux through unit normal `n` moving at normal speed `vn`.
    pub fn flux(&self, n: &Vec3, vn: Real) -> Flux {
        let un = self.u.dot(n) - vn;
        let mass = self.rho * un;
        Flux {
            rho: mass,
            m: self.u * mass + n * self.p,
            et: self.h * mass + self.p * vn,
        }
    }
}

/// Roe flux per unit area through the unit normal `n`.
///
/// `vn` is the normal speed of the face. When the two states are equal the
/// dissipation vanishes exactly and the result is the physical flux.
pub fn roe_flux(
    left: &FaceState,
    right: &FaceState,
    n: &Vec3,
    vn: Real,
    gamma: Real,
    fix: EntropyFix,
    roe_average: bool,
) -> Flux {
    let central = (left.flux(n, vn) + right.flux(n, vn)) * 0.5;

    let (rho, u, h) = if roe_average {
        let sl = left.rho.sqrt();
        let sr = right.rho.sqrt();
        let inv = 1.0 / (sl + sr);
        (
            sl * sr,
            (left.u * sl + right.u * sr) * inv,
            (left.h * sl + right.h * sr) * inv,
        )
    } else {
        (
            0.5 * (left.rho + right.rho),
            (left.u + right.u) * 0.5,
            0.5 * (left.h + right.h),
        )
    };
    let q2 = u.norm_squared();
    let c2 = ((gamma - 1.0) * (h - 0.5 * q2)).max(Real::MIN_POSITIVE);
    let c = c2.sqrt();
    let un_abs = u.dot(n);
    let un = un_abs - vn;

    let delta = un.abs() + c;
    let l1 = harten(un - c, fix.nonlinear * delta);
    let l2 = harten(un, fix.linear * delta);
    let l3 = harten(un + c, fix.nonlinear * delta);

    let d_rho = right.rho - left.rho;
    let d_p = right.p - left.p;
    let d_u = right.u - left.u;
    let d_un = d_u.dot(n);
    let d_ut = d_u - n * d_un;

    let a1 = (d_p - rho * c * d_un) / (2.0 * c2);
    let a3 = (d_p + rho * c * d_un) / (2.0 * c2);
    let a2 = d_rho - d_p / c2;

    let w1 = l1 * a1;
    let w2 = l2 * a2;
    let w3 = l3 * a3;
    let ws = l2 * rho;

    let dissipation = Flux {
        rho: w1 + w2 + w3,
        m: (u - n * c) * w1 + u * w2 + (u + n * c) * w3 + d_ut * ws,
        et: (h - c * un_abs) * w1 + 0.5 * q2 * w2 + (h + c * un_abs) * w3 + u.dot(&d_ut) * ws,
    };

    central - dissipation * 0.5
}

/// Harten's entropy fix: `|λ|` away from zero, a parabola within `δ` of it.
#[inline]
pub fn harten(lambda: Real, delta: Real) -> Real {
    let a = lambda.abs();
    if a >= delta || delta <= 0.0 {
        a
    } else {
        (lambda * lambda + delta * delta) / (2.0 * delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAMMA: Real = 1.4;

    fn state(rho: Real, u: Vec3, p: Real) -> FaceState {
        FaceState::new(rho, u, p, GAMMA)
    }

    #[test]
    fn equal_states_give_physical_flux() {
        let s = state(1.2, Vec3::new(10.0, 2.0, -1.0), 1.0e5);
        let n = Vec3::new(0.6, 0.8, 0.0);
        let f = roe_flux(&s, &s, &n, 0.0, GAMMA, EntropyFix::default(), true);
        assert_eq!(f, s.flux(&n, 0.0));
    }

    #[test]
    fn fluxes_are_antisymmetric_in_the_normal() {
        let l = state(1.0, Vec3::new(0.5, 0.1, 0.0), 1.0);
        let r = state(0.125, Vec3::new(0.0, 0.0, 0.2), 0.1);
        let n = Vec3::new(1.0, 0.0, 0.0);
        let fix = EntropyFix::default();
        let forward = roe_flux(&l, &r, &n, 0.0, GAMMA, fix, true);
        let backward = roe_flux(&r, &l, &(-n), 0.0, GAMMA, fix, true);
        let sum = forward + backward;
        assert!(sum.rho.abs() < 1e-14);
        assert!(sum.m.norm() < 1e-14);
        assert!(sum.et.abs() < 1e-14);
    }

    #[test]
    fn supersonic_flux_is_fully_upwind() {
        let l = state(1.0, Vec3::new(3.0, 0.0, 0.0), 1.0);
        let r = state(0.5, Vec3::new(2.5, 0.0, 0.0), 0.4);
        let n = Vec3::x();
        let f = roe_flux(&l, &r, &n, 0.0, GAMMA, EntropyFix { linear: 0.0, nonlinear: 0.0 }, true);
        let up = l.flux(&n, 0.0);
        assert!((f.rho - up.rho).abs() < 1e-12);
        assert!((f.m - up.m).norm() < 1e-12);
        assert!((f.et - up.et).abs() < 1e-12);
    }

    #[test]
    fn stationary_contact_is_preserved() {
        // Equal pressure and zero velocity: only the entropy wave, with λ = 0.
        let l = state(1.0, Vec3::zeros(), 1.0);
        let r = state(0.5, Vec3::zeros(), 1.0);
        let f = roe_flux(&l, &r, &Vec3::x(), 0.0, GAMMA, EntropyFix { linear: 0.0, nonlinear: 0.0 }, true);
        assert!(f.rho.abs() < 1e-14);
        assert!((f.m.x - 1.0).abs() < 1e-14);
    }

    #[test]
    fn moving_face_sees_relative_velocity() {
        let s = state(1.0, Vec3::new(2.0, 0.0, 0.0), 1.0);
        let f = s.flux(&Vec3::x(), 2.0);
        assert_eq!(f.rho, 0.0);
        assert_eq!(f.m, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(f.et, 2.0);
    }

    #[test]
    fn harten_smooths_near_zero() {
        assert_eq!(harten(-2.0, 0.5), 2.0);
        assert_eq!(harten(0.0, 0.5), 0.25);
        assert_eq!(harten(0.0, 0.0), 0.0);
        assert!(harten(0.1, 0.5) > 0.1);
    }

    #[test]
    fn arithmetic_average_also_consistent() {
        let s = state(0.8, Vec3::new(-4.0, 1.0, 0.0), 2.0e4);
        let n = Vec3::y();
        let f = roe_flux(&s, &s, &n, 0.3, GAMMA, EntropyFix::default(), false);
        assert_eq!(f, s.flux(&n, 0.3));
    }
}
