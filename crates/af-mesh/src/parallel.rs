//! Cross-partition reductions and point-to-point exchange.
//!
//! Each partition runs in its own process and owns its cells. Everything that
//! needs a global view (residual norms, global time-step bounds, Courant
//! statistics) goes through a `Communicator`; every call is a blocking
//! collective, so all ranks must make the same calls in the same order.

use af_core::Real;

/// Blocking collectives over all partitions.
pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn sum(&self, local: Real) -> Real;

    fn max(&self, local: Real) -> Real;

    fn min(&self, local: Real) -> Real;

    /// Send `send` to `neighbour` and return what it sent back.
    /// Buffers must have matching layouts on both sides.
    fn exchange(&self, neighbour: usize, send: &[Real]) -> Vec<Real>;

    /// Element-wise sum of a small buffer.
    fn sum_all(&self, values: &mut [Real]) {
        for v in values.iter_mut() {
            *v = self.sum(*v);
        }
    }
}

/// Single-partition communicator. Reductions are identities and exchange
/// loops the buffer back, so a processor patch facing its own rank sees its
/// own near-boundary cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn sum(&self, local: Real) -> Real {
        local
    }

    fn max(&self, local: Real) -> Real {
        local
    }

    fn min(&self, local: Real) -> Real {
        local
    }

    fn exchange(&self, _neighbour: usize, send: &[Real]) -> Vec<Real> {
        send.to_vec()
    }
}
