//! Turbulence model selection tags.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::TurbulenceError;

/// Closure selected at setup time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Laminar or inviscid; every operator is a no-op.
    #[default]
    Off,
    SpalartAllmaras,
    KOmegaSst,
}

impl ModelKind {
    /// Number of transported scalars.
    pub fn equations(self) -> usize {
        match self {
            ModelKind::Off => 0,
            ModelKind::SpalartAllmaras => 1,
            ModelKind::KOmegaSst => 2,
        }
    }

    /// Canonical tag.
    pub fn tag(self) -> &'static str {
        match self {
            ModelKind::Off => "off",
            ModelKind::SpalartAllmaras => "SpalartAllmaras",
            ModelKind::KOmegaSst => "KappaOmega",
        }
    }

    /// Parse an optional tag; a missing tag means `Off`.
    pub fn from_tag(tag: Option<&str>) -> Result<Self, TurbulenceError> {
        match tag {
            None => Ok(ModelKind::Off),
            Some(t) => t.parse(),
        }
    }

    /// Parse a tag, falling back to `Off` (with a warning) when unrecognised.
    pub fn from_tag_or_off(tag: Option<&str>) -> Self {
        Self::from_tag(tag).unwrap_or_else(|err| {
            warn!(%err, "turbulence disabled");
            ModelKind::Off
        })
    }
}

impl FromStr for ModelKind {
    type Err = TurbulenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let is = |name: &str| t.eq_ignore_ascii_case(name);
        if t.is_empty() || is("off") || is("none") || is("laminar") {
            Ok(ModelKind::Off)
        } else if is("SA") || is("SpalartAllmaras") {
            Ok(ModelKind::SpalartAllmaras)
        } else if is("KW") || is("KappaOmega") || is("kOmegaSST") || is("SST") {
            Ok(ModelKind::KOmegaSst)
        } else {
            Err(TurbulenceError::UnknownModel { tag: t.to_owned() })
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
