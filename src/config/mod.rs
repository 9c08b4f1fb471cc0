// src/config/mod.rs

//! TOML configuration: raw serde model, duration parsing, loading and
//! validation into an [`crate::engine::EngineConfig`] plus a job list.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path};
pub use model::{ConfigFile, EngineSection, JobConfig, RawConfigFile};
