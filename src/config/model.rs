// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::{EngineConfig, Job};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// default_timeout = "120s"
/// max_concurrent = 10
/// search_paths = ["~/go/bin"]
///
/// [engine.env]
/// NO_COLOR = "1"
///
/// [[job]]
/// name = "subfinder"
/// cmd = ["subfinder", "-d", "example.com", "-silent"]
/// timeout = "10m"
/// ```
///
/// Durations stay strings here; they are parsed during validation so errors
/// can name the offending job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    /// All `[[job]]` entries, in file order.
    #[serde(default)]
    pub job: Vec<JobConfig>,
}

/// `[engine]` section. Unset values fall back to [`EngineConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    pub default_timeout: Option<String>,
    pub max_concurrent: Option<usize>,
    pub grace_period: Option<String>,
    pub drain_timeout: Option<String>,
    pub max_output_bytes: Option<usize>,

    /// Directories searched after `PATH`; `~` is expanded.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Environment overrides for every child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// One `[[job]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub name: String,

    /// Program followed by its arguments. No shell is involved.
    pub cmd: Vec<String>,

    pub timeout: Option<String>,

    /// Working directory, relative to the process working directory.
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Human-readable label; defaults to the command line.
    pub description: Option<String>,

    /// Text fed to the child's stdin.
    pub stdin: Option<String>,
}

/// Validated configuration. Only built through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineConfig,
    pub jobs: Vec<Job>,
}
