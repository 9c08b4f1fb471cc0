// src/engine/batch.rs

//! Named-job orchestration on top of an [`Executor`].
//!
//! The batch runner resolves each job's tool, dispatches all jobs at once
//! (the executor bounds real concurrency), and then records every
//! non-successful result in the manual log in submission order.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::exec::{Executor, InvocationRequest, InvocationResult};
use crate::manual::ManualLog;

/// A named request, usually one `[[job]]` entry from the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub request: InvocationRequest,
}

impl Job {
    pub fn new(name: impl Into<String>, request: InvocationRequest) -> Self {
        Self {
            name: name.into(),
            request,
        }
    }
}

/// A job together with its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub name: String,
    pub description: String,
    pub result: InvocationResult,
}

#[derive(Debug)]
pub struct BatchRunner<E: Executor> {
    executor: Arc<E>,
    manual_log: ManualLog,
}

impl<E: Executor> BatchRunner<E> {
    pub fn new(executor: Arc<E>, manual_log: ManualLog) -> Self {
        Self {
            executor,
            manual_log,
        }
    }

    pub fn manual_log(&self) -> &ManualLog {
        &self.manual_log
    }

    /// Run every job and return the reports in input order.
    pub async fn run(&self, jobs: Vec<Job>) -> Vec<JobReport> {
        info!(jobs = jobs.len(), "starting batch");

        let mut pending = Vec::with_capacity(jobs.len());
        for job in jobs {
            let description = job.request.description().to_string();
            let argv = job.request.argv().to_vec();
            let handle = self
                .prepare(job.request)
                .map(|request| tokio::spawn(self.executor.dispatch(request)));
            pending.push((job.name, description, argv, handle));
        }

        let mut reports = Vec::with_capacity(pending.len());
        for (name, description, argv, handle) in pending {
            let result = match handle {
                None => {
                    warn!(job = %name, tool = %argv[0], "tool not found; skipping");
                    self.executor.report_missing(argv)
                }
                Some(handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => InvocationResult::spawn_failed(
                        argv,
                        format!("task failed: {e}"),
                        Duration::ZERO,
                    ),
                },
            };

            if result.success() {
                info!(job = %name, summary = %result.summary(), "job finished");
            } else {
                warn!(job = %name, summary = %result.summary(), "job did not succeed");
            }
            self.manual_log.record_failure(description.clone(), &result);
            reports.push(JobReport {
                name,
                description,
                result,
            });
        }

        let failed = reports.iter().filter(|r| !r.result.success()).count();
        info!(total = reports.len(), failed, "batch complete");
        reports
    }

    /// Resolve a bare program name to a path. `None` means the tool is not
    /// installed. Programs given as paths are passed through.
    fn prepare(&self, request: InvocationRequest) -> Option<InvocationRequest> {
        let program = request.program();
        if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
            return Some(request);
        }
        let path = self.executor.resolve_tool(program)?;
        Some(request.with_program(path.to_string_lossy().into_owned()))
    }
}
