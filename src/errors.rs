// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Expected runtime conditions (missing tool, non-zero exit, timeout) are
//! never errors: they are encoded in [`crate::exec::InvocationResult`].
//! What remains here is configuration, malformed requests and IO around the
//! persisted logs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid invocation request: {0}")]
    InvalidRequest(String),

    #[error("Invalid duration: {0}")]
    DurationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReconrunError>;
