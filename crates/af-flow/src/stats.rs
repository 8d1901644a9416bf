//! Global statistics of per-cell scalars.

use af_core::Real;
use af_mesh::Communicator;

/// Minimum, maximum, mean and standard deviation over all partitions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldStats {
    pub min: Real,
    pub max: Real,
    pub mean: Real,
    pub std: Real,
}

impl FieldStats {
    pub fn compute<C: Communicator + ?Sized>(values: &[Real], comm: &C) -> Self {
        let local_min = values.iter().copied().fold(Real::INFINITY, Real::min);
        let local_max = values.iter().copied().fold(Real::NEG_INFINITY, Real::max);
        let mut sums = [
            values.len() as Real,
            values.iter().sum::<Real>(),
            values.iter().map(|v| v * v).sum::<Real>(),
        ];
        comm.sum_all(&mut sums);
        let [count, sum, sum_sq] = sums;
        if count == 0.0 {
            return Self::default();
        }
        let mean = sum / count;
        Self {
            min: comm.min(local_min),
            max: comm.max(local_max),
            mean,
            std: (sum_sq / count - mean * mean).max(0.0).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_mesh::SerialComm;

    #[test]
    fn simple_sample() {
        let s = FieldStats::compute(&[1.0, 2.0, 3.0, 4.0], &SerialComm);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.5);
        assert!((s.std - 1.25_f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(FieldStats::compute(&[], &SerialComm), FieldStats::default());
    }
}
