//! Pressure loads on boundary patches.

use af_core::{Real, Vec3};
use af_flow::{FlowContext, MeanFlow};
use serde::Serialize;

use crate::error::{SolverError, SolverResult};

/// Force and moment summed over a set of patches and all partitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Loads {
    pub force: [Real; 3],
    pub moment: [Real; 3],
}

/// Integrate `(p − p_ref) S` and its moment about `centre` over the named patches.
///
/// Uses the owner-cell pressure on each face.
pub fn pressure_loads(
    ctx: &FlowContext<'_>,
    flow: &MeanFlow,
    patches: &[&str],
    reference_pressure: Real,
    centre: Vec3,
) -> SolverResult<Loads> {
    let mesh = ctx.mesh;
    let owner = mesh.owner();
    let sf = mesh.area_vectors();
    let xf = mesh.face_centres();
    let p = flow.pressure();

    let mut force = Vec3::zeros();
    let mut moment = Vec3::zeros();
    for name in patches {
        let patch = mesh.patch_by_name(name).ok_or_else(|| SolverError::UnknownPatch {
            name: (*name).to_owned(),
        })?;
        for f in patch.faces() {
            let df = sf[f] * (p[owner[f]] - reference_pressure);
            force += df;
            moment += (xf[f] - centre).cross(&df);
        }
    }

    let mut buf = [force.x, force.y, force.z, moment.x, moment.y, moment.z];
    ctx.comm.sum_all(&mut buf);
    Ok(Loads {
        force: [buf[0], buf[1], buf[2]],
        moment: [buf[3], buf[4], buf[5]],
    })
}
