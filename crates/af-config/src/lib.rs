//! af-config: YAML case files for aeroflow.
//!
//! A case names the mesh, gas, free stream, numerical options, turbulence
//! closure and run controls. `CaseFile::into_setup` validates it and resolves
//! every tag into the typed options the solver crates take.

pub mod schema;
pub mod setup;
pub mod validate;

use std::path::Path;

pub use schema::*;
pub use setup::{CaseSetup, LoadsRequest};
pub use validate::{ValidationError, validate_case};

/// Newest case file version understood.
pub const LATEST_VERSION: u32 = 1;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mesh error: {0}")]
    Mesh(#[from] af_mesh::MeshError),

    #[error("Thermodynamics error: {0}")]
    Thermo(#[from] af_thermo::ThermoError),

    #[error("Flow error: {0}")]
    Flow(#[from] af_flow::FlowError),

    #[error("Turbulence error: {0}")]
    Turbulence(#[from] af_turbulence::TurbulenceError),

    #[error("Solver error: {0}")]
    Solver(#[from] af_solver::SolverError),
}

pub fn from_yaml_str(content: &str) -> ConfigResult<CaseFile> {
    let case: CaseFile = serde_yaml::from_str(content)?;
    validate_case(&case)?;
    Ok(case)
}

pub fn load_yaml(path: &Path) -> ConfigResult<CaseFile> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &Path, case: &CaseFile) -> ConfigResult<()> {
    validate_case(case)?;
    let content = serde_yaml::to_string(case)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ConfigResult<CaseFile> {
    let content = std::fs::read_to_string(path)?;
    let case: CaseFile = serde_json::from_str(&content)?;
    validate_case(&case)?;
    Ok(case)
}
