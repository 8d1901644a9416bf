//! Turbulence closures driven together with the mean flow.

use af_core::{Real, SCALAR_FLOOR, Vec3};
use af_flow::{DtBound, EddyView, FlowContext, FlowOptions, MeanFlow, TimeStepping};
use af_mesh::{CartesianSpec, Geometry, Mesh, PatchKind, SerialComm};
use af_thermo::{PerfectGas, Primitive, Thermodynamics};
use af_turbulence::{ModelKind, Turbulence, TurbulenceOptions};
use proptest::prelude::*;

const ALPHAS: [Real; 4] = [0.25, 1.0 / 3.0, 0.5, 1.0];

fn far_field_box() -> Mesh {
    let spec = CartesianSpec::new([10, 10, 1], Vec3::new(1.0, 1.0, 0.1)).with_kinds([
        PatchKind::FarField,
        PatchKind::FarField,
        PatchKind::FarField,
        PatchKind::FarField,
        PatchKind::Empty,
        PatchKind::Empty,
    ]);
    Mesh::cartesian(&spec).unwrap()
}

fn flat_plate() -> Mesh {
    let spec = CartesianSpec::new([8, 8, 1], Vec3::new(1.0, 0.5, 0.1)).with_kinds([
        PatchKind::FarField,
        PatchKind::Extrapolated,
        PatchKind::Wall,
        PatchKind::FarField,
        PatchKind::Empty,
        PatchKind::Empty,
    ]);
    Mesh::cartesian(&spec).unwrap()
}

fn free_stream(gas: &PerfectGas, u: Real) -> Primitive {
    let t = 300.0;
    Primitive::new(1.2 * gas.gas_constant() * t, Vec3::new(u, 0.0, 0.0), t)
}

/// One pseudo-time step of the coupled system.
fn iterate(ctx: &FlowContext<'_>, flow: &mut MeanFlow, turb: &mut Turbulence, cfl: Real) {
    flow.update_dt(ctx, &turb.eddy(), TimeStepping::Local, cfl, DtBound::default());
    flow.begin_pseudo_step();
    turb.begin_pseudo_step();
    for alpha in ALPHAS {
        flow.reset_rhs();
        turb.reset_rhs();
        flow.advection(ctx);
        flow.diffusion(ctx, &turb.eddy());
        flow.source(ctx, false);
        turb.advection(ctx, flow);
        turb.diffusion(ctx, flow);
        turb.source(ctx, flow, false);
        flow.update_residuals(ctx);
        turb.update_residuals(ctx);
        flow.solve(ctx, alpha, 0, 0.0);
        turb.solve(ctx, flow, alpha, 0, 0.0);
        flow.update(ctx);
        turb.update(ctx, flow);
    }
}

#[test]
fn spalart_allmaras_free_stream_is_preserved_exactly() {
    let mesh = far_field_box();
    let gas = PerfectGas::air();
    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), free_stream(&gas, 10.0)).unwrap();
    let mut turb = Turbulence::new(
        ModelKind::SpalartAllmaras,
        &ctx,
        &flow,
        &TurbulenceOptions::default(),
        None,
    )
    .unwrap();
    let nu_tilde = turb.equations()[0].values().to_vec();
    let initial: Vec<_> = (0..mesh.n_cells()).map(|i| flow.conservative(i)).collect();

    for _ in 0..20 {
        iterate(&ctx, &mut flow, &mut turb, 2.0);
        assert!(turb.equations()[0].rhs().iter().all(|&r| r == 0.0));
        assert_eq!(turb.residual(), 0.0);
        assert_eq!(flow.residual(), 0.0);
    }
    assert_eq!(turb.equations()[0].values(), nu_tilde.as_slice());
    for (i, expected) in initial.iter().enumerate() {
        assert_eq!(&flow.conservative(i), expected);
    }
}

#[test]
fn off_leaves_the_mean_flow_untouched() {
    let mesh = flat_plate();
    let gas = PerfectGas::air();
    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let state = free_stream(&gas, 30.0);
    let mut coupled = MeanFlow::uniform(&ctx, FlowOptions::default(), state).unwrap();
    let mut alone = coupled.clone();
    let mut off = Turbulence::new(ModelKind::Off, &ctx, &coupled, &TurbulenceOptions::default(), None).unwrap();

    for _ in 0..5 {
        iterate(&ctx, &mut coupled, &mut off, 0.8);

        let eddy = EddyView::none();
        alone.update_dt(&ctx, &eddy, TimeStepping::Local, 0.8, DtBound::default());
        alone.begin_pseudo_step();
        for alpha in ALPHAS {
            alone.reset_rhs();
            alone.advection(&ctx);
            alone.diffusion(&ctx, &eddy);
            alone.source(&ctx, false);
            alone.update_residuals(&ctx);
            alone.solve(&ctx, alpha, 0, 0.0);
            alone.update(&ctx);
        }
        assert_eq!(coupled.dt(), alone.dt());
        assert_eq!(coupled.rhs_energy(), alone.rhs_energy());
        assert_eq!(off.residual(), -1.0);
    }
    for i in 0..mesh.n_cells() {
        assert_eq!(coupled.conservative(i), alone.conservative(i));
    }
}

#[test]
fn sst_boundary_layer_stays_bounded() {
    let mesh = flat_plate();
    let gas = PerfectGas::air();
    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), free_stream(&gas, 30.0)).unwrap();
    let mut turb = Turbulence::new(
        ModelKind::KOmegaSst,
        &ctx,
        &flow,
        &TurbulenceOptions::default(),
        None,
    )
    .unwrap();

    for _ in 0..30 {
        iterate(&ctx, &mut flow, &mut turb, 0.5);
    }
    for eq in turb.equations() {
        assert!(eq.values().iter().all(|v| v.is_finite() && *v >= SCALAR_FLOOR), "{}", eq.name());
    }
    let eddy = turb.eddy();
    for i in 0..mesh.n_cells() {
        assert!(eddy.mu_t(i).is_finite() && eddy.mu_t(i) >= 0.0);
        assert!(flow.density()[i] > 0.0);
    }
    assert!(turb.residual() >= 0.0);
}

#[test]
fn spalart_allmaras_wall_pins_nu_tilde() {
    let mesh = flat_plate();
    let gas = PerfectGas::air();
    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), free_stream(&gas, 30.0)).unwrap();
    let mut turb = Turbulence::new(
        ModelKind::SpalartAllmaras,
        &ctx,
        &flow,
        &TurbulenceOptions::default(),
        None,
    )
    .unwrap();
    for _ in 0..10 {
        iterate(&ctx, &mut flow, &mut turb, 0.5);
    }
    let nif = mesh.n_internal_faces();
    let wall = mesh.patch_by_name("ymin").unwrap();
    let bnd = turb.equations()[0].boundary_values();
    assert!(wall.faces().all(|f| bnd[f - nif] == 0.0));
    assert!(turb.equations()[0].values().iter().all(|v| v.is_finite() && *v >= SCALAR_FLOOR));
}

#[test]
fn split_dual_time_matches_unsteady_source() {
    let mesh = flat_plate();
    let gas = PerfectGas::air();
    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), free_stream(&gas, 30.0)).unwrap();
    flow.set_physical_dt(Some(1e-4)).unwrap();
    let mut turb = Turbulence::new(
        ModelKind::KOmegaSst,
        &ctx,
        &flow,
        &TurbulenceOptions::default(),
        None,
    )
    .unwrap();
    flow.store();
    turb.store();
    iterate(&ctx, &mut flow, &mut turb, 0.5);

    let mut direct = turb.clone();
    direct.reset_rhs();
    direct.source(&ctx, &flow, true);

    let mut split = turb.clone();
    split.reset_rhs();
    split.source(&ctx, &flow, false);
    split.build_dts(&ctx, &flow, 1).unwrap();
    split.build_dts(&ctx, &flow, 2).unwrap();

    for (a, b) in direct.equations().iter().zip(split.equations()) {
        assert_eq!(a.rhs(), b.rhs());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn scalars_never_drop_below_the_floor(
        seeds in proptest::collection::vec(-1e-3f64..1e-3, 64),
        alpha in 0.1f64..1.0,
    ) {
        let mesh = flat_plate();
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let mut flow = MeanFlow::uniform(&ctx, FlowOptions::default(), free_stream(&gas, 30.0)).unwrap();
        flow.update_dt(&ctx, &EddyView::none(), TimeStepping::Local, 0.5, DtBound::default());
        let mut turb = Turbulence::new(
            ModelKind::SpalartAllmaras,
            &ctx,
            &flow,
            &TurbulenceOptions::default(),
            None,
        )
        .unwrap();
        let eq = &mut turb.equations_mut()[0];
        eq.set_values(&seeds).unwrap();
        turb.update(&ctx, &flow);
        turb.begin_pseudo_step();
        turb.reset_rhs();
        turb.advection(&ctx, &flow);
        turb.diffusion(&ctx, &flow);
        turb.source(&ctx, &flow, false);
        turb.solve(&ctx, &flow, alpha, 1, 0.3);
        for &v in turb.equations()[0].values() {
            prop_assert!(v >= SCALAR_FLOOR);
        }
    }
}
