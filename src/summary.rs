// src/summary.rs

//! `summary.json`: engine counters plus per-job result metadata.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::engine::{EngineSummary, JobReport};
use crate::errors::Result;
use crate::types::Outcome;

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub engine: EngineSummary,
    pub manual_commands: usize,
    pub jobs: Vec<JobSummary>,
}

/// Result metadata for one job. Output bodies are left out.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub name: String,
    pub description: String,
    pub argv: Vec<String>,
    pub success: bool,
    pub outcome: Outcome,
    pub return_code: i32,
    pub timed_out: bool,
    pub duration_secs: f64,
    pub stdout_bytes: usize,
    pub failure_reason: Option<String>,
}

impl From<&JobReport> for JobSummary {
    fn from(report: &JobReport) -> Self {
        let r = &report.result;
        Self {
            name: report.name.clone(),
            description: report.description.clone(),
            argv: r.argv.clone(),
            success: r.success(),
            outcome: r.outcome,
            return_code: r.return_code,
            timed_out: r.timed_out,
            duration_secs: r.duration.as_secs_f64(),
            stdout_bytes: r.stdout.len(),
            failure_reason: r.failure_reason(),
        }
    }
}

impl RunSummary {
    pub fn new(engine: EngineSummary, reports: &[JobReport], manual_commands: usize) -> Self {
        Self {
            engine,
            manual_commands,
            jobs: reports.iter().map(JobSummary::from).collect(),
        }
    }
}

pub fn write_summary(output_dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(SUMMARY_FILE);
    fs::write(&path, serde_json::to_string_pretty(summary)?)?;
    Ok(path)
}
