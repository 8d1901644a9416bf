//! Face fluxes are added to owners and subtracted from neighbours, so the
//! rhs summed over all cells equals the net boundary flux.

use af_core::{PatchId, Vec3};
use af_flow::{EddyView, FlowContext, FlowOptions, MeanFlow};
use af_mesh::{CartesianSpec, Geometry, Mesh, PatchKind, SerialComm};
use af_thermo::{PerfectGas, Primitive, Thermodynamics};
use proptest::prelude::*;

fn closed_box() -> Mesh {
    let spec = CartesianSpec::new([5, 4, 1], Vec3::new(5.0, 4.0, 1.0)).with_kinds([
        PatchKind::Wall,
        PatchKind::Wall,
        PatchKind::Wall,
        PatchKind::Symmetry,
        PatchKind::Empty,
        PatchKind::Empty,
    ]);
    Mesh::cartesian(&spec).unwrap()
}

fn states() -> impl Strategy<Value = Vec<(f64, f64, f64, f64)>> {
    prop::collection::vec(
        (0.5f64..2.0, -50.0f64..50.0, -50.0f64..50.0, 5.0e4f64..2.0e5),
        20,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn closed_box_conserves_mass_and_energy(raw in states()) {
        let mesh = closed_box();
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let initial: Vec<Primitive> = raw
            .iter()
            .map(|&(rho, ux, uy, p)| {
                Primitive::new(p, Vec3::new(ux, uy, 0.0), p / (rho * gas.gas_constant()))
            })
            .collect();
        let mut flow = MeanFlow::new(&ctx, FlowOptions::default(), &initial, initial[0]).unwrap();
        flow.reset_rhs();
        flow.advection(&ctx);
        flow.diffusion(&ctx, &EddyView::none());

        let scale_rho: f64 = flow.rhs_density().iter().map(|r| r.abs()).sum::<f64>() + 1.0;
        let scale_et: f64 = flow.rhs_energy().iter().map(|r| r.abs()).sum::<f64>() + 1.0;
        let sum_rho: f64 = flow.rhs_density().iter().sum();
        let sum_et: f64 = flow.rhs_energy().iter().sum();
        prop_assert!(sum_rho.abs() <= 1e-12 * scale_rho);
        prop_assert!(sum_et.abs() <= 1e-12 * scale_et);
    }

    #[test]
    fn rhs_sum_equals_boundary_flux(raw in states()) {
        let spec = CartesianSpec::new([5, 4, 1], Vec3::new(5.0, 4.0, 1.0)).with_kinds([
            PatchKind::FarField,
            PatchKind::Extrapolated,
            PatchKind::Wall,
            PatchKind::FarField,
            PatchKind::Empty,
            PatchKind::Empty,
        ]);
        let mesh = Mesh::cartesian(&spec).unwrap();
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let initial: Vec<Primitive> = raw
            .iter()
            .map(|&(rho, ux, uy, p)| {
                Primitive::new(p, Vec3::new(ux, uy, 0.0), p / (rho * gas.gas_constant()))
            })
            .collect();
        let far = Primitive::new(1.0e5, Vec3::new(20.0, 0.0, 0.0), 300.0);
        let mut flow = MeanFlow::new(&ctx, FlowOptions::euler(), &initial, far).unwrap();

        let fluxes = flow.convective_fluxes(&ctx);
        flow.reset_rhs();
        flow.advection(&ctx);

        let nif = mesh.n_internal_faces();
        let boundary_mass: f64 = fluxes[nif..].iter().map(|f| f.rho).sum();
        let boundary_m: Vec3 = fluxes[nif..].iter().map(|f| f.m).sum();
        let total_mass: f64 = flow.rhs_density().iter().sum();
        let total_m: Vec3 = flow.rhs_momentum().iter().sum();
        let scale: f64 = fluxes.iter().map(|f| f.rho.abs() + f.m.norm()).sum::<f64>() + 1.0;
        prop_assert!((total_mass - boundary_mass).abs() <= 1e-12 * scale);
        prop_assert!((total_m - boundary_m).norm() <= 1e-12 * scale);
    }

    #[test]
    fn periodic_strip_fluxes_cancel_pairwise(raw in prop::collection::vec(
        (0.5f64..2.0, -50.0f64..50.0, 5.0e4f64..2.0e5),
        6,
    )) {
        let spec = CartesianSpec::new([6, 1, 1], Vec3::new(6.0, 1.0, 1.0)).with_kinds([
            PatchKind::Cyclic { partner: PatchId::from_index(1) },
            PatchKind::Cyclic { partner: PatchId::from_index(0) },
            PatchKind::Empty,
            PatchKind::Empty,
            PatchKind::Empty,
            PatchKind::Empty,
        ]);
        let mesh = Mesh::cartesian(&spec).unwrap();
        let gas = PerfectGas::air();
        let ctx = FlowContext::new(&mesh, &gas, &SerialComm);
        let initial: Vec<Primitive> = raw
            .iter()
            .map(|&(rho, ux, p)| Primitive::new(p, Vec3::new(ux, 0.0, 0.0), p / (rho * gas.gas_constant())))
            .collect();
        let mut flow = MeanFlow::new(&ctx, FlowOptions::euler(), &initial, initial[0]).unwrap();

        let fluxes = flow.convective_fluxes(&ctx);
        let xmin = mesh.patch_by_name("xmin").unwrap().faces();
        let xmax = mesh.patch_by_name("xmax").unwrap().faces();
        for (a, b) in xmin.zip(xmax) {
            prop_assert_eq!(fluxes[a], fluxes[b] * -1.0);
        }

        flow.reset_rhs();
        flow.advection(&ctx);
        let scale: f64 = fluxes.iter().map(|f| f.rho.abs() + f.m.norm() + f.et.abs()).sum::<f64>() + 1.0;
        let sum_rho: f64 = flow.rhs_density().iter().sum();
        let sum_m: Vec3 = flow.rhs_momentum().iter().sum();
        let sum_et: f64 = flow.rhs_energy().iter().sum();
        prop_assert!(sum_rho.abs() <= 1e-13 * scale);
        prop_assert!(sum_m.norm() <= 1e-13 * scale);
        prop_assert!(sum_et.abs() <= 1e-13 * scale);
    }
}
