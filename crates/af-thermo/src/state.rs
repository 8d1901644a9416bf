//! Flow state definitions.

use af_core::units::{Pressure, Temperature, Velocity};
use af_core::{Real, Vec3};

use crate::error::{ThermoError, ThermoResult};

/// Primitive state: pressure [Pa], velocity [m/s], temperature [K].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub p: Real,
    pub u: Vec3,
    pub t: Real,
}

/// Conservative state: density [kg/m³], momentum [kg/(m²·s)], total energy [J/m³].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conservative {
    pub rho: Real,
    pub m: Vec3,
    pub et: Real,
}

impl Primitive {
    pub fn new(p: Real, u: Vec3, t: Real) -> Self {
        Self { p, u, t }
    }

    /// Create a state from SI quantities.
    ///
    /// Validates that pressure and temperature are positive and finite.
    pub fn from_si(p: Pressure, u: [Velocity; 3], t: Temperature) -> ThermoResult<Self> {
        let p_val = p.value;
        if !p_val.is_finite() || p_val <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }

        let t_val = t.value;
        if !t_val.is_finite() || t_val <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }

        let u = Vec3::new(u[0].value, u[1].value, u[2].value);
        if !u.iter().all(|c| c.is_finite()) {
            return Err(ThermoError::NonPhysical {
                what: "velocity must be finite",
            });
        }

        Ok(Self { p: p_val, u, t: t_val })
    }
}

impl Conservative {
    pub fn new(rho: Real, m: Vec3, et: Real) -> Self {
        Self { rho, m, et }
    }

    /// Velocity `m/ρ`.
    pub fn velocity(&self) -> Vec3 {
        self.m / self.rho
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::units::{k, mps, pa};

    #[test]
    fn create_valid_state() {
        let s = Primitive::from_si(pa(101_325.0), [mps(10.0), mps(0.0), mps(0.0)], k(300.0))
            .unwrap();
        assert_eq!(s.p, 101_325.0);
        assert_eq!(s.u.x, 10.0);
        assert_eq!(s.t, 300.0);
    }

    #[test]
    fn reject_negative_pressure() {
        let r = Primitive::from_si(pa(-100.0), [mps(0.0); 3], k(300.0));
        assert!(r.is_err());
    }

    #[test]
    fn reject_zero_temperature() {
        let r = Primitive::from_si(pa(101_325.0), [mps(0.0); 3], k(0.0));
        assert!(r.is_err());
    }

    #[test]
    fn reject_non_finite_velocity() {
        let r = Primitive::from_si(pa(1.0), [mps(f64::NAN), mps(0.0), mps(0.0)], k(300.0));
        assert!(r.is_err());
    }
}
