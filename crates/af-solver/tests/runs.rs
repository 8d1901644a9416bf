//! Steady and unsteady runs through the solver driver.

use af_core::Vec3;
use af_flow::{FlowContext, FlowOptions, MeanFlow};
use af_mesh::{CartesianSpec, Geometry, Mesh, MeshMotion, PatchKind, SerialComm};
use af_solver::{Solver, SolverOptions, UnsteadyOptions, pressure_loads};
use af_thermo::{PerfectGas, Primitive, Thermodynamics};
use af_turbulence::{ModelKind, Turbulence, TurbulenceOptions};

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

fn air(gas: &PerfectGas, u: Vec3) -> Primitive {
    let t = 300.0;
    Primitive::new(1.2 * gas.gas_constant() * t, u, t)
}

fn unsteady(dt: f64, steps: usize, inner: usize) -> SolverOptions {
    SolverOptions {
        unsteady: Some(UnsteadyOptions {
            dt,
            steps,
            inner_iterations: inner,
            inner_tolerance: 1e-8,
        }),
        ..SolverOptions::default()
    }
}

#[test]
fn uniform_box_with_spalart_allmaras_converges_at_once() {
    let mesh = far_field_box();
    let gas = PerfectGas::air();
    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let flow = MeanFlow::uniform(&ctx, FlowOptions::default(), air(&gas, Vec3::new(10.0, 0.0, 0.0))).unwrap();
    let turb = Turbulence::new(
        ModelKind::SpalartAllmaras,
        &ctx,
        &flow,
        &TurbulenceOptions::default(),
        None,
    )
    .unwrap();
    let mut solver = Solver::new(SolverOptions::default(), flow, turb).unwrap();

    let mut reports = Vec::new();
    let summary = solver.run_steady(&ctx, |r| reports.push(*r)).unwrap();
    assert!(summary.converged);
    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.flow_residual, 0.0);
    assert_eq!(summary.turbulence_residual, 0.0);
    assert_eq!(summary.turbulence_model, "SpalartAllmaras");
    assert_eq!(reports.len(), 1);
    assert!(reports[0].dt_min > 0.0 && reports[0].dt_min <= reports[0].dt_max);
}

#[test]
fn uniform_strip_stays_uniform_under_dual_time_stepping() {
    let mut mesh = Mesh::strip(10, 1.0, PatchKind::FarField, PatchKind::FarField).unwrap();
    let gas = PerfectGas::air();
    let state = air(&gas, Vec3::new(20.0, 0.0, 0.0));
    let flow = {
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        MeanFlow::uniform(&ctx, FlowOptions::euler(), state).unwrap()
    };
    let mut solver = Solver::new(unsteady(1e-3, 3, 5), flow, Turbulence::Off).unwrap();
    let before = solver.flow().conservative(0);

    let mut steps = Vec::new();
    let summary = solver
        .run_unsteady(&mut mesh, &gas, &SerialComm, None, |s| steps.push(s.step))
        .unwrap();
    assert_eq!(steps, vec![1, 2, 3]);
    assert_eq!(summary.physical_steps, 3);
    assert!((summary.time - 3e-3).abs() < 1e-15);
    assert_eq!(summary.flow_residual, 0.0);
    for i in 0..mesh.n_cells() {
        assert_eq!(solver.flow().conservative(i), before);
    }
}

#[test]
fn translating_mesh_keeps_free_stream() {
    let mut mesh = far_field_box();
    let gas = PerfectGas::air();
    let state = air(&gas, Vec3::new(10.0, 0.0, 0.0));
    let flow = {
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        MeanFlow::uniform(&ctx, FlowOptions::euler(), state).unwrap()
    };
    let mut solver = Solver::new(unsteady(1e-4, 4, 5), flow, Turbulence::Off).unwrap();
    let rho0 = solver.flow().density()[0];
    let motion = MeshMotion::Translation {
        velocity: Vec3::new(-5.0, 2.0, 0.0),
    };

    solver
        .run_unsteady(&mut mesh, &gas, &SerialComm, Some(motion), |_| {})
        .unwrap();
    assert!(!mesh.has_moved());
    let shift = mesh.cell_centres()[0] - Vec3::new(0.05, 0.05, 0.05);
    assert!((shift - Vec3::new(-2e-3, 8e-4, 0.0)).norm() < 1e-12);
    for i in 0..mesh.n_cells() {
        assert!((solver.flow().density()[i] - rho0).abs() < 1e-9 * rho0);
        assert!((solver.flow().velocity()[i] - state.u).norm() < 1e-7);
    }
}

#[test]
fn dual_time_shock_tube_stays_positive() {
    let mut mesh = Mesh::strip(100, 1.0, PatchKind::Wall, PatchKind::Wall).unwrap();
    let gas = PerfectGas::air();
    let initial: Vec<_> = mesh
        .cell_centres()
        .iter()
        .map(|c| {
            let (rho, p) = if c.x < 0.5 { (1.0, 1.0) } else { (0.125, 0.1) };
            Primitive::new(p, Vec3::zeros(), p / (rho * gas.gas_constant()))
        })
        .collect();
    let (flow, mass0) = {
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let flow = MeanFlow::new(&ctx, FlowOptions::euler(), &initial, initial[0]).unwrap();
        let (mass, _, _) = flow.totals(&ctx);
        (flow, mass)
    };
    let mut solver = Solver::new(unsteady(1e-3, 50, 30), flow, Turbulence::Off).unwrap();
    solver
        .run_unsteady(&mut mesh, &gas, &SerialComm, None, |s| {
            assert!(s.last.flow_residual.is_finite());
        })
        .unwrap();

    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let flow = solver.flow();
    assert!(flow.density().iter().all(|&r| r > 0.0));
    assert!(flow.pressure().iter().all(|&p| p > 0.0));
    let (mass, _, _) = flow.totals(&ctx);
    assert!((mass - mass0).abs() < 1e-2 * mass0);
    // the rarefaction head has not reached x = 0.1 by t = 0.05
    assert!((flow.density()[10] - 1.0).abs() < 1e-3);
    // the discontinuity has spread
    assert!(flow.velocity()[50].x > 0.1);

    // pressure pushes the left wall outward harder than the right
    let loads = pressure_loads(&ctx, flow, &["xmin", "xmax"], 0.0, Vec3::zeros()).unwrap();
    assert!(loads.force[0] < 0.0);
}

#[test]
fn empty_patch_list_gives_zero_loads() {
    let mesh = far_field_box();
    let gas = PerfectGas::air();
    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let state = air(&gas, Vec3::zeros());
    let flow = MeanFlow::uniform(&ctx, FlowOptions::euler(), state).unwrap();
    let loads = pressure_loads(&ctx, &flow, &[], 0.0, Vec3::zeros()).unwrap();
    assert_eq!(loads, af_solver::Loads::default());
}
