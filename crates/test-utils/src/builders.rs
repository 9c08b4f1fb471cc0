#![allow(dead_code)]

use std::collections::BTreeMap;

use reconrun::config::{ConfigFile, EngineSection, JobConfig, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                engine: EngineSection::default(),
                job: Vec::new(),
            },
        }
    }

    pub fn with_job(mut self, job: JobConfig) -> Self {
        self.config.job.push(job);
        self
    }

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.config.engine.max_concurrent = Some(n);
        self
    }

    pub fn default_timeout(mut self, d: &str) -> Self {
        self.config.engine.default_timeout = Some(d.to_string());
        self
    }

    pub fn grace_period(mut self, d: &str) -> Self {
        self.config.engine.grace_period = Some(d.to_string());
        self
    }

    pub fn engine_env(mut self, key: &str, value: &str) -> Self {
        self.config.engine.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(name: &str, cmd: &[&str]) -> Self {
        Self {
            job: JobConfig {
                name: name.to_string(),
                cmd: cmd.iter().map(|s| s.to_string()).collect(),
                timeout: None,
                cwd: None,
                env: BTreeMap::new(),
                description: None,
                stdin: None,
            },
        }
    }

    pub fn timeout(mut self, d: &str) -> Self {
        self.job.timeout = Some(d.to_string());
        self
    }

    pub fn description(mut self, d: &str) -> Self {
        self.job.description = Some(d.to_string());
        self
    }

    pub fn cwd(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.job.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.job.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
