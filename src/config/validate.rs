// src/config/validate.rs

use std::collections::BTreeSet;

use crate::config::duration::parse_positive_duration;
use crate::config::model::{ConfigFile, EngineSection, JobConfig, RawConfigFile};
use crate::engine::{EngineConfig, Job};
use crate::errors::{ReconrunError, Result};
use crate::exec::InvocationRequest;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ReconrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_jobs(&raw)?;
        ensure_unique_names(&raw)?;
        let engine = build_engine_config(&raw.engine)?;
        let jobs = raw
            .job
            .into_iter()
            .map(build_job)
            .collect::<Result<Vec<_>>>()?;
        Ok(ConfigFile { engine, jobs })
    }
}

fn ensure_has_jobs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(ReconrunError::ConfigError(
            "config must contain at least one [[job]] entry".to_string(),
        ));
    }
    Ok(())
}

fn ensure_unique_names(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = BTreeSet::new();
    for (idx, job) in cfg.job.iter().enumerate() {
        if job.name.trim().is_empty() {
            return Err(ReconrunError::ConfigError(format!(
                "job #{} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(job.name.as_str()) {
            return Err(ReconrunError::ConfigError(format!(
                "duplicate job name '{}'",
                job.name
            )));
        }
    }
    Ok(())
}

fn build_engine_config(section: &EngineSection) -> Result<EngineConfig> {
    let mut cfg = EngineConfig::default();

    if let Some(s) = &section.default_timeout {
        cfg.default_timeout = field_duration("[engine].default_timeout", s)?;
    }
    if let Some(s) = &section.grace_period {
        cfg.grace_period = field_duration("[engine].grace_period", s)?;
    }
    if let Some(s) = &section.drain_timeout {
        cfg.drain_timeout = field_duration("[engine].drain_timeout", s)?;
    }
    if let Some(n) = section.max_concurrent {
        if n == 0 {
            return Err(ReconrunError::ConfigError(
                "[engine].max_concurrent must be >= 1 (got 0)".to_string(),
            ));
        }
        cfg.max_concurrent = n;
    }
    if let Some(n) = section.max_output_bytes {
        if n == 0 {
            return Err(ReconrunError::ConfigError(
                "[engine].max_output_bytes must be >= 1 (got 0)".to_string(),
            ));
        }
        cfg.max_output_bytes = n;
    }
    cfg.env = section.env.clone();
    cfg.search_paths = section.search_paths.clone();

    Ok(cfg)
}

fn build_job(job: JobConfig) -> Result<Job> {
    if job.cmd.first().is_none_or(|p| p.trim().is_empty()) {
        return Err(ReconrunError::ConfigError(format!(
            "job '{}' has an empty `cmd`",
            job.name
        )));
    }

    let mut request = InvocationRequest::new(job.cmd)?.with_env(job.env);
    if let Some(s) = &job.timeout {
        let timeout = field_duration(&format!("job '{}' timeout", job.name), s)?;
        request = request.with_timeout(timeout)?;
    }
    if let Some(cwd) = job.cwd {
        request = request.with_cwd(cwd);
    }
    if let Some(description) = job.description {
        request = request.with_description(description);
    }
    if let Some(input) = job.stdin {
        request = request.with_stdin(input.into_bytes());
    }

    Ok(Job::new(job.name, request))
}

fn field_duration(field: &str, value: &str) -> Result<std::time::Duration> {
    parse_positive_duration(value)
        .map_err(|e| ReconrunError::ConfigError(format!("{field}: {e}")))
}
