//! The closure selected for a run.

use af_core::Real;
use af_flow::{EddyView, FlowContext, MeanFlow};
use af_relax::residual::NO_RESIDUAL;
use tracing::info;

use crate::error::{TurbulenceError, TurbulenceResult};
use crate::k_omega_sst::KOmegaSst;
use crate::kind::ModelKind;
use crate::model::TurbulenceModel;
use crate::options::TurbulenceOptions;
use crate::scalar::ScalarEquation;
use crate::spalart_allmaras::SpalartAllmaras;

/// Turbulence closure, fixed at setup.
///
/// `Off` holds nothing: every operator is a no-op, the residual is −1 and
/// the mean flow sees no eddy viscosity.
#[derive(Clone, Debug, Default)]
pub enum Turbulence {
    #[default]
    Off,
    SpalartAllmaras(SpalartAllmaras),
    KOmegaSst(KOmegaSst),
}

/// Forward to the active closure, or evaluate `$off` for `Off`.
macro_rules! dispatch {
    ($self:expr, $m:ident => $call:expr, off => $off:expr) => {
        match $self {
            Turbulence::Off => $off,
            Turbulence::SpalartAllmaras($m) => $call,
            Turbulence::KOmegaSst($m) => $call,
        }
    };
}

impl Turbulence {
    /// Build the closure for `kind`.
    ///
    /// `free_stream` overrides the free-stream scalars derived from the mean
    /// far field and must hold exactly one value per transported scalar.
    pub fn new(
        kind: ModelKind,
        ctx: &FlowContext<'_>,
        flow: &MeanFlow,
        options: &TurbulenceOptions,
        free_stream: Option<&[Real]>,
    ) -> TurbulenceResult<Self> {
        options.validate()?;
        let derived = match kind {
            ModelKind::Off => Vec::new(),
            ModelKind::SpalartAllmaras => SpalartAllmaras::free_stream(ctx, flow, options),
            ModelKind::KOmegaSst => KOmegaSst::free_stream(ctx, flow, options),
        };
        let values = free_stream.unwrap_or(&derived);
        if values.len() != kind.equations() {
            return Err(TurbulenceError::EquationCount {
                model: kind.tag(),
                expected: kind.equations(),
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(TurbulenceError::InvalidArg {
                what: "free-stream turbulence values must be finite and non-negative",
            });
        }

        let model = match kind {
            ModelKind::Off => Turbulence::Off,
            ModelKind::SpalartAllmaras => {
                Turbulence::SpalartAllmaras(SpalartAllmaras::new(ctx, flow, options, values[0]))
            }
            ModelKind::KOmegaSst => {
                Turbulence::KOmegaSst(KOmegaSst::new(ctx, flow, options, values[0], values[1]))
            }
        };
        info!(model = %kind, free_stream = ?values, "turbulence closure selected");
        Ok(model)
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Turbulence::Off => ModelKind::Off,
            Turbulence::SpalartAllmaras(_) => ModelKind::SpalartAllmaras,
            Turbulence::KOmegaSst(_) => ModelKind::KOmegaSst,
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, Turbulence::Off)
    }

    pub fn equations(&self) -> &[ScalarEquation] {
        dispatch!(self, m => m.equations(), off => &[])
    }

    pub fn equations_mut(&mut self) -> &mut [ScalarEquation] {
        dispatch!(self, m => m.equations_mut(), off => &mut [])
    }

    pub fn advection(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow) {
        dispatch!(self, m => m.advection(ctx, flow), off => ())
    }

    pub fn diffusion(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow) {
        dispatch!(self, m => m.diffusion(ctx, flow), off => ())
    }

    pub fn source(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, unsteady: bool) {
        dispatch!(self, m => m.source(ctx, flow, unsteady), off => ())
    }

    pub fn body(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, unsteady: bool) {
        dispatch!(self, m => m.body(ctx, flow, unsteady), off => ())
    }

    pub fn solve(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, alpha: Real, iterations: usize, epsilon: Real) {
        dispatch!(self, m => m.solve(ctx, flow, alpha, iterations, epsilon), off => ())
    }

    pub fn update(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow) {
        dispatch!(self, m => m.update(ctx, flow), off => ())
    }

    pub fn store(&mut self) {
        dispatch!(self, m => m.store(), off => ())
    }

    pub fn begin_pseudo_step(&mut self) {
        dispatch!(self, m => m.begin_pseudo_step(), off => ())
    }

    pub fn reset_rhs(&mut self) {
        dispatch!(self, m => m.reset_rhs(), off => ())
    }

    pub fn reset_body(&mut self) {
        dispatch!(self, m => m.reset_body(), off => ())
    }

    /// Dual-time source halves. `Off` accepts any call.
    pub fn build_dts(&mut self, ctx: &FlowContext<'_>, flow: &MeanFlow, half: u8) -> TurbulenceResult<()> {
        dispatch!(self, m => m.build_dts(ctx, flow, half), off => Ok(()))
    }

    pub fn update_residuals(&mut self, ctx: &FlowContext<'_>) {
        dispatch!(self, m => m.update_residuals(ctx), off => ())
    }

    /// Largest scalar residual; always −1 for `Off`.
    pub fn residual(&self) -> Real {
        dispatch!(self, m => m.residual(), off => NO_RESIDUAL)
    }

    pub fn reset_residual(&mut self) {
        dispatch!(self, m => m.reset_residual(), off => ())
    }

    pub fn eddy(&self) -> EddyView<'_> {
        dispatch!(self, m => m.eddy(), off => EddyView::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::Vec3;
    use af_flow::FlowOptions;
    use af_mesh::{Mesh, PatchKind, SerialComm};
    use af_thermo::{PerfectGas, Primitive};

    fn strip() -> (Mesh, PerfectGas) {
        let mesh = Mesh::strip(8, 1.0, PatchKind::FarField, PatchKind::FarField).unwrap();
        (mesh, PerfectGas::air())
    }

    #[test]
    fn off_is_inert() {
        let (mesh, gas) = strip();
        let comm = SerialComm;
        let ctx = FlowContext::new(&mesh, &gas, &comm);
        let state = Primitive::new(1e5, Vec3::new(50.0, 0.0, 0.0), 300.0);
        let flow = MeanFlow::uniform(&ctx, FlowOptions::default(), state).unwrap();

        let mut t = Turbulence::new(ModelKind::Off, &ctx, &flow, &TurbulenceOptions::default(), None).unwrap();
        assert!(t.is_off());
        t.reset_rhs();
        t.advection(&ctx, &flow);
        t.diffusion(&ctx, &flow);
        t.source(&ctx, &flow, true);
        t.solve(&ctx, &flow, 1.0, 2, 0.5);
        t.update_residuals(&ctx);
        assert!(t.build_dts(&ctx, &flow, 1).is_ok());
        assert_eq!(t.residual(), -1.0);
        assert!(t.eddy().is_laminar());
        assert!(t.equations().is_empty());
    }

    #[test]
    fn free_stream_count_is_checked() {
        let (mesh, gas) = strip();
        let comm = SerialComm;
        let ctx = FlowContext::new(&mesh, &gas, &comm);
        let state = Primitive::new(1e5, Vec3::new(50.0, 0.0, 0.0), 300.0);
        let flow = MeanFlow::uniform(&ctx, FlowOptions::default(), state).unwrap();
        let options = TurbulenceOptions::default();

        let err = Turbulence::new(ModelKind::KOmegaSst, &ctx, &flow, &options, Some(&[1.0])).unwrap_err();
        assert!(matches!(
            err,
            TurbulenceError::EquationCount { expected: 2, actual: 1, .. }
        ));
        assert!(Turbulence::new(ModelKind::Off, &ctx, &flow, &options, Some(&[1.0])).is_err());
        assert!(Turbulence::new(ModelKind::SpalartAllmaras, &ctx, &flow, &options, Some(&[-1.0])).is_err());
    }

    #[test]
    fn derived_free_stream_values() {
        let (mesh, gas) = strip();
        let comm = SerialComm;
        let ctx = FlowContext::new(&mesh, &gas, &comm);
        let state = Primitive::new(1e5, Vec3::new(50.0, 0.0, 0.0), 300.0);
        let flow = MeanFlow::uniform(&ctx, FlowOptions::default(), state).unwrap();
        let options = TurbulenceOptions::default();

        let t = Turbulence::new(ModelKind::KOmegaSst, &ctx, &flow, &options, None).unwrap();
        let k = t.equations()[0].free_stream();
        // k = 1.5 (0.01 · 50)²
        assert!((k - 0.375).abs() < 1e-12);
        assert_eq!(t.equations().len(), 2);
        assert!(!t.eddy().is_laminar());
    }
}
