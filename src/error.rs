//! Error types for the simulation core and its controller
//!
//! Factory errors are programmer/configuration bugs and are never retried.
//! Transition errors are caught at the controller boundary and reported.

use std::fmt;

use thiserror::Error;

use crate::transition::LevelId;

/// Which factory table a tag was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantFamily {
    Plane,
    Projectile,
}

impl fmt::Display for VariantFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plane => write!(f, "plane"),
            Self::Projectile => write!(f, "projectile"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    #[error("unknown {family} type: '{tag}'")]
    UnknownVariant { family: VariantFamily, tag: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no level registered under '{0}'")]
    InvalidTarget(LevelId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}
