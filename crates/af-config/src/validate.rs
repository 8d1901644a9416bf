//! Case validation logic.

use af_mesh::generate::CARTESIAN_PATCHES;
use af_turbulence::ModelKind;

use crate::schema::{
    CaseFile, DtBoundDef, GasDef, MeshDef, MotionDef, PatchKindDef, SolverDef, TurbulenceDef,
    UnsteadyDef, ViscosityDef,
};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_case(case: &CaseFile) -> Result<(), ValidationError> {
    if case.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }
    if case.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: String::new(),
            reason: "must not be empty".to_string(),
        });
    }

    validate_mesh(&case.mesh)?;
    validate_gas(&case.gas)?;

    let fs = &case.free_stream;
    validate_positive_finite("free_stream.pressure_pa", fs.pressure_pa)?;
    validate_positive_finite("free_stream.temperature_k", fs.temperature_k)?;
    for (axis, u) in fs.velocity_mps.iter().enumerate() {
        validate_finite(&format!("free_stream.velocity_mps[{axis}]"), *u)?;
    }

    let flow = &case.flow;
    validate_non_negative_finite("flow.entropy_fix_linear", flow.entropy_fix_linear)?;
    validate_non_negative_finite("flow.entropy_fix_nonlinear", flow.entropy_fix_nonlinear)?;
    validate_positive_finite("flow.density_floor", flow.density_floor)?;

    validate_turbulence(&case.turbulence)?;
    validate_solver(&case.solver)?;
    if let Some(unsteady) = &case.unsteady {
        validate_unsteady(unsteady)?;
    }

    if let Some(loads) = &case.loads {
        // strips carry the same six patches, with empty sides
        for p in &loads.patches {
            if !CARTESIAN_PATCHES.contains(&p.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: p.clone(),
                    context: "loads.patches".to_string(),
                });
            }
        }
        if let Some(p_ref) = loads.reference_pressure_pa {
            validate_finite("loads.reference_pressure_pa", p_ref)?;
        }
    }

    Ok(())
}

fn validate_mesh(mesh: &MeshDef) -> Result<(), ValidationError> {
    match mesh {
        MeshDef::Cartesian {
            cells,
            lengths,
            origin,
            patches,
        } => {
            for (axis, n) in cells.iter().enumerate() {
                if *n == 0 {
                    return Err(ValidationError::InvalidValue {
                        field: format!("mesh.cells[{axis}]"),
                        value: n.to_string(),
                        reason: "must be positive".to_string(),
                    });
                }
            }
            for (axis, l) in lengths.iter().enumerate() {
                validate_positive_finite(&format!("mesh.lengths[{axis}]"), *l)?;
            }
            for (axis, o) in origin.iter().enumerate() {
                validate_finite(&format!("mesh.origin[{axis}]"), *o)?;
            }
            for (name, kind) in patches {
                if !CARTESIAN_PATCHES.contains(&name.as_str()) {
                    return Err(ValidationError::MissingReference {
                        id: name.clone(),
                        context: "mesh.patches".to_string(),
                    });
                }
                validate_partner(name, kind)?;
            }
        }
        MeshDef::Strip {
            cells,
            length,
            left,
            right,
        } => {
            if *cells == 0 {
                return Err(ValidationError::InvalidValue {
                    field: "mesh.cells".to_string(),
                    value: cells.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            validate_positive_finite("mesh.length", *length)?;
            validate_partner("xmin", left)?;
            validate_partner("xmax", right)?;
        }
    }
    Ok(())
}

fn validate_partner(name: &str, kind: &PatchKindDef) -> Result<(), ValidationError> {
    if let PatchKindDef::Cyclic { partner } = kind {
        if !CARTESIAN_PATCHES.contains(&partner.as_str()) {
            return Err(ValidationError::MissingReference {
                id: partner.clone(),
                context: format!("cyclic partner of '{name}'"),
            });
        }
        if partner == name {
            return Err(ValidationError::InvalidValue {
                field: format!("mesh.patches.{name}"),
                value: partner.clone(),
                reason: "a cyclic patch cannot pair with itself".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_gas(gas: &GasDef) -> Result<(), ValidationError> {
    validate_positive_finite("gas.gas_constant", gas.gas_constant)?;
    validate_positive_finite("gas.prandtl", gas.prandtl)?;
    validate_positive_finite("gas.turbulent_prandtl", gas.turbulent_prandtl)?;
    if !(gas.gamma.is_finite() && gas.gamma > 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "gas.gamma".to_string(),
            value: gas.gamma.to_string(),
            reason: "must exceed 1".to_string(),
        });
    }
    match gas.viscosity {
        ViscosityDef::None => {}
        ViscosityDef::Constant { mu } => validate_non_negative_finite("gas.viscosity", mu)?,
        ViscosityDef::Sutherland { mu_ref, t_ref, s } => {
            validate_positive_finite("gas.viscosity.mu_ref", mu_ref)?;
            validate_positive_finite("gas.viscosity.t_ref", t_ref)?;
            validate_positive_finite("gas.viscosity.s", s)?;
        }
    }
    Ok(())
}

fn validate_turbulence(turb: &TurbulenceDef) -> Result<(), ValidationError> {
    let kind = if turb.strict {
        ModelKind::from_tag(turb.model.as_deref()).map_err(|e| ValidationError::Unsupported {
            feature: "turbulence.model".to_string(),
            reason: e.to_string(),
        })?
    } else {
        ModelKind::from_tag(turb.model.as_deref()).unwrap_or_default()
    };

    if let Some(values) = &turb.free_stream {
        if values.len() != kind.equations() {
            return Err(ValidationError::InvalidValue {
                field: "turbulence.free_stream".to_string(),
                value: format!("{values:?}"),
                reason: format!("{kind} transports {} scalars", kind.equations()),
            });
        }
        for v in values {
            validate_non_negative_finite("turbulence.free_stream", *v)?;
        }
    }
    validate_positive_finite("turbulence.floor", turb.floor)?;
    validate_positive_finite("turbulence.nu_tilde_ratio", turb.nu_tilde_ratio)?;
    validate_non_negative_finite("turbulence.intensity", turb.intensity)?;
    validate_positive_finite("turbulence.viscosity_ratio", turb.viscosity_ratio)?;

    let sa = &turb.spalart_allmaras;
    for (field, v) in [
        ("sigma", sa.sigma),
        ("kappa", sa.kappa),
        ("cb1", sa.cb1),
        ("cb2", sa.cb2),
        ("cv1", sa.cv1),
        ("cw2", sa.cw2),
        ("cw3", sa.cw3),
    ] {
        if let Some(v) = v {
            validate_positive_finite(&format!("turbulence.spalart_allmaras.{field}"), v)?;
        }
    }
    let sst = &turb.k_omega_sst;
    for (field, v) in [("beta_star", sst.beta_star), ("a1", sst.a1), ("c1", sst.c1)] {
        if let Some(v) = v {
            validate_positive_finite(&format!("turbulence.k_omega_sst.{field}"), v)?;
        }
    }
    for (field, v) in [
        ("spalart_allmaras.entropy_fix", sa.entropy_fix),
        ("k_omega_sst.entropy_fix", sst.entropy_fix),
    ] {
        if let Some(v) = v {
            validate_non_negative_finite(&format!("turbulence.{field}"), v)?;
        }
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    if solver.stages.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "solver.stages".to_string(),
            value: "[]".to_string(),
            reason: "at least one stage is required".to_string(),
        });
    }
    for (i, a) in solver.stages.iter().enumerate() {
        if !(a.is_finite() && *a > 0.0 && *a <= 1.0) {
            return Err(ValidationError::InvalidValue {
                field: format!("solver.stages[{i}]"),
                value: a.to_string(),
                reason: "must lie in (0, 1]".to_string(),
            });
        }
    }
    validate_positive_finite("solver.cfl", solver.cfl)?;
    if let DtBoundDef::Global { ratio } | DtBoundDef::Local { ratio } = solver.dt_bound {
        if !(ratio.is_finite() && ratio >= 1.0) {
            return Err(ValidationError::InvalidValue {
                field: "solver.dt_bound.ratio".to_string(),
                value: ratio.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
    }
    if !(solver.smoothing_epsilon.is_finite() && (0.0..1.0).contains(&solver.smoothing_epsilon)) {
        return Err(ValidationError::InvalidValue {
            field: "solver.smoothing_epsilon".to_string(),
            value: solver.smoothing_epsilon.to_string(),
            reason: "must lie in [0, 1)".to_string(),
        });
    }
    validate_positive_finite("solver.tolerance", solver.tolerance)?;
    if solver.log_every == 0 {
        return Err(ValidationError::InvalidValue {
            field: "solver.log_every".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_unsteady(unsteady: &UnsteadyDef) -> Result<(), ValidationError> {
    validate_positive_finite("unsteady.dt_s", unsteady.dt_s)?;
    validate_positive_finite("unsteady.inner_tolerance", unsteady.inner_tolerance)?;
    for (field, n) in [
        ("unsteady.steps", unsteady.steps),
        ("unsteady.inner_iterations", unsteady.inner_iterations),
    ] {
        if n == 0 {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
    }
    match unsteady.motion {
        Some(MotionDef::Translation { velocity_mps }) => {
            for (axis, v) in velocity_mps.iter().enumerate() {
                validate_finite(&format!("unsteady.motion.velocity_mps[{axis}]"), *v)?;
            }
        }
        Some(MotionDef::Stretch { axis, origin, rate }) => {
            if axis > 2 {
                return Err(ValidationError::InvalidValue {
                    field: "unsteady.motion.axis".to_string(),
                    value: axis.to_string(),
                    reason: "must be 0, 1 or 2".to_string(),
                });
            }
            validate_finite("unsteady.motion.origin", origin)?;
            validate_finite("unsteady.motion.rate", rate)?;
            if 1.0 + rate * unsteady.dt_s <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "unsteady.motion.rate".to_string(),
                    value: rate.to_string(),
                    reason: "collapses the mesh within one step".to_string(),
                });
            }
        }
        None => {}
    }
    Ok(())
}

fn validate_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}

fn validate_positive_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn validate_non_negative_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}
