use strum::EnumIs;
use thiserror::Error;

use crate::key::Key;

/// Failures raised by the index and its configuration loader.
#[derive(Debug, Error, EnumIs)]
pub enum IndexError {
    /// An exact lookup found several branches for the same key. The index is corrupted and must
    /// not be used any further.
    #[error(
        "Structural invariant violated at level {level}: exact lookup of key {key} yielded {candidates} branches, at most one is allowed."
    )]
    StructuralInvariantViolation {
        level: usize,
        key: Key,
        candidates: usize,
    },

    /// The configuration file is not valid TOML or has unknown fields.
    #[error("Failed to parse index configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;
