//! Residual norms and normalisation.

use af_core::{FieldValue, RESIDUAL_REFERENCE_FLOOR, Real};
use af_mesh::Communicator;

/// Sentinel for "not applicable / not computed yet".
pub const NO_RESIDUAL: Real = -1.0;

/// How the raw residual norm is scaled before it is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Normalization {
    /// Report the raw RMS.
    None,
    /// Divide by the largest RMS seen so far.
    #[default]
    Max,
    /// Divide by the first non-zero RMS.
    Initial,
}

/// Root-mean-square of an rhs array over all partitions.
///
/// Both the sum of squares and the cell count are reduced, so every rank
/// gets the same value.
pub fn rms<T, C>(rhs: &[T], comm: &C) -> Real
where
    T: FieldValue,
    C: Communicator + ?Sized,
{
    let local: Real = rhs.iter().map(|r| r.mag_sqr()).sum();
    let sum = comm.sum(local);
    let count = comm.sum(rhs.len() as Real);
    if count > 0.0 { (sum / count).sqrt() } else { 0.0 }
}

/// Normalised residual of one equation.
#[derive(Clone, Debug)]
pub struct ResidualTracker {
    normalization: Normalization,
    reference: Real,
    initialised: bool,
    raw: Real,
    value: Real,
}

impl ResidualTracker {
    pub fn new(normalization: Normalization) -> Self {
        Self {
            normalization,
            reference: RESIDUAL_REFERENCE_FLOOR,
            initialised: false,
            raw: NO_RESIDUAL,
            value: NO_RESIDUAL,
        }
    }

    /// Normalised residual, or −1 before the first `record`.
    pub fn value(&self) -> Real {
        self.value
    }

    /// Last raw RMS, or −1 before the first `record`.
    pub fn raw(&self) -> Real {
        self.raw
    }

    pub fn reference(&self) -> Real {
        self.reference
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Record the RMS of `rhs` and return the normalised residual.
    pub fn record<T, C>(&mut self, rhs: &[T], comm: &C) -> Real
    where
        T: FieldValue,
        C: Communicator + ?Sized,
    {
        self.record_norm(rms(rhs, comm))
    }

    /// Record an already reduced norm.
    pub fn record_norm(&mut self, norm: Real) -> Real {
        self.raw = norm;
        self.value = match self.normalization {
            Normalization::None => norm,
            Normalization::Max => {
                self.reference = self.reference.max(norm);
                norm / self.reference
            }
            Normalization::Initial => {
                if !self.initialised && norm > 0.0 {
                    self.reference = norm.max(RESIDUAL_REFERENCE_FLOOR);
                    self.initialised = true;
                }
                norm / self.reference
            }
        };
        self.value
    }

    /// Forget the reference and the last value.
    pub fn reset(&mut self) {
        *self = Self::new(self.normalization);
    }
}

impl Default for ResidualTracker {
    fn default() -> Self {
        Self::new(Normalization::default())
    }
}
