//! Metric identities that every generated box must satisfy.

use af_core::Vec3;
use af_mesh::{CartesianSpec, Geometry, Mesh, PatchKind};
use proptest::prelude::*;

fn boxes() -> impl Strategy<Value = ([usize; 3], Vec3)> {
    (
        (1usize..6, 1usize..6, 1usize..4),
        (0.1f64..10.0, 0.1f64..10.0, 0.1f64..10.0),
    )
        .prop_map(|((nx, ny, nz), (lx, ly, lz))| ([nx, ny, nz], Vec3::new(lx, ly, lz)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_cell_is_closed((cells, lengths) in boxes()) {
        let mesh = Mesh::cartesian(&CartesianSpec::new(cells, lengths)).unwrap();
        let owner = mesh.owner();
        let sf = mesh.area_vectors();
        let scale = lengths.x.max(lengths.y).max(lengths.z).powi(2);
        for cell in 0..mesh.n_cells() {
            let mut sum = Vec3::zeros();
            for &f in mesh.cell_faces(cell) {
                if owner[f] == cell {
                    sum += sf[f];
                } else {
                    sum -= sf[f];
                }
            }
            prop_assert!(sum.norm() <= 1e-12 * scale, "cell {cell}: {sum:?}");
        }
    }

    #[test]
    fn volumes_fill_the_box((cells, lengths) in boxes()) {
        let mesh = Mesh::cartesian(&CartesianSpec::new(cells, lengths)).unwrap();
        let total: f64 = mesh.volumes().iter().sum();
        let expected = lengths.x * lengths.y * lengths.z;
        prop_assert!((total - expected).abs() <= 1e-12 * expected);
        prop_assert_eq!(mesh.n_cells(), cells[0] * cells[1] * cells[2]);
    }

    #[test]
    fn flat_wall_distance_is_the_height((cells, lengths) in boxes()) {
        let spec = CartesianSpec::new(cells, lengths).with_kinds([
            PatchKind::FarField,
            PatchKind::FarField,
            PatchKind::Wall,
            PatchKind::FarField,
            PatchKind::Empty,
            PatchKind::Empty,
        ]);
        let mesh = Mesh::cartesian(&spec).unwrap();
        for (d, xc) in mesh.wall_distance().iter().zip(mesh.cell_centres()) {
            prop_assert!((d - xc.y).abs() <= 1e-12 * lengths.y);
        }
    }
}
