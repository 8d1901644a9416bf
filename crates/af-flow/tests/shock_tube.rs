//! Sod's shock tube in a closed tube, integrated in time with explicit stages.

use af_core::Vec3;
use af_flow::{DtBound, EddyView, FlowContext, FlowOptions, MeanFlow, TimeStepping};
use af_mesh::{Geometry, Mesh, PatchKind, SerialComm};
use af_thermo::{PerfectGas, Primitive, Thermodynamics};

const CELLS: usize = 200;
const END_TIME: f64 = 0.2;

fn sod(gas: &PerfectGas, x: f64) -> Primitive {
    let (rho, p) = if x < 0.5 { (1.0, 1.0) } else { (0.125, 0.1) };
    Primitive::new(p, Vec3::zeros(), p / (rho * gas.gas_constant()))
}

fn sample(mesh: &Mesh, values: &[f64], x: f64) -> f64 {
    let i = mesh
        .cell_centres()
        .iter()
        .position(|c| c.x > x)
        .unwrap_or(values.len() - 1);
    values[i]
}

#[test]
fn sod_shock_tube() {
    let mesh = Mesh::strip(CELLS, 1.0, PatchKind::Wall, PatchKind::Wall).unwrap();
    let gas = PerfectGas::air();
    let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
    let initial: Vec<_> = mesh.cell_centres().iter().map(|c| sod(&gas, c.x)).collect();
    let mut flow = MeanFlow::new(&ctx, FlowOptions::euler(), &initial, initial[0]).unwrap();
    let eddy = EddyView::none();

    let (mass0, _, energy0) = flow.totals(&ctx);
    let mut time = 0.0;
    let mut steps = 0;
    while time < END_TIME {
        flow.update_dt(&ctx, &eddy, TimeStepping::Global, 0.5, DtBound::None);
        time += flow.dt()[0];
        flow.begin_pseudo_step();
        for alpha in [0.25, 1.0 / 3.0, 0.5, 1.0] {
            flow.reset_rhs();
            flow.advection(&ctx);

            // the only momentum entering the tube is the wall pressure force
            let p = flow.pressure();
            let net: f64 = flow.rhs_momentum().iter().map(|m| m.x).sum();
            let walls = p[CELLS - 1] - p[0];
            assert!((net - walls).abs() < 1e-12);

            flow.solve(&ctx, alpha, 0, 0.0);
            flow.update(&ctx);
        }
        steps += 1;
        assert!(steps < 10_000);

        let (mass, _, energy) = flow.totals(&ctx);
        assert!((mass - mass0).abs() < 1e-11 * mass0);
        assert!((energy - energy0).abs() < 1e-11 * energy0);
    }
    assert!(flow.density().iter().all(|&r| r > 0.0));
    assert!(flow.pressure().iter().all(|&p| p > 0.0));

    let rho = flow.density();
    let p = flow.pressure();
    let u: Vec<f64> = flow.velocity().iter().map(|v| v.x).collect();

    // undisturbed states beyond the rarefaction head and the shock
    assert!((sample(&mesh, rho, 0.05) - 1.0).abs() < 1e-3);
    assert!((sample(&mesh, rho, 0.97) - 0.125).abs() < 1e-3);
    // star region: p* = 0.3031, u* = 0.9275, post-shock density 0.2656
    assert!((sample(&mesh, p, 0.75) - 0.3031).abs() < 0.02);
    assert!((sample(&mesh, &u, 0.75) - 0.9275).abs() < 0.05);
    assert!((sample(&mesh, rho, 0.78) - 0.2656).abs() < 0.04);
    // the shock sits near x = 0.85
    assert!(sample(&mesh, rho, 0.82) > 0.2);
    assert!(sample(&mesh, rho, 0.89) < 0.15);
}
