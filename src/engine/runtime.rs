// src/engine/runtime.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::capture::OutputCapture;
use crate::exec::collector::collect;
use crate::exec::launcher::{SpawnErrorKind, launch};
use crate::exec::registry::ActiveInvocation;
use crate::exec::signal::{ProcessTarget, terminate};
use crate::exec::supervisor::supervise;
use crate::exec::{
    BinaryResolver, ConcurrencyLimiter, DispatchFuture, Executor, InvocationId,
    InvocationRequest, InvocationResult, InvocationSnapshot, Registry,
};

use super::config::EngineConfig;
use super::stats::{EngineStats, EngineSummary};

/// Extra slack on top of grace + drain before shutdown gives up waiting and
/// force-kills whatever is still registered.
const SHUTDOWN_SLACK: Duration = Duration::from_secs(1);

/// Concurrent external-process execution engine.
///
/// Cheap to clone; all clones share the same limiter, registry and stats.
/// Every submitted request yields exactly one [`InvocationResult`]: expected
/// failures (missing tool, non-zero exit, timeout, cancel) are encoded in
/// the result, never returned as errors.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    resolver: BinaryResolver,
    limiter: ConcurrencyLimiter,
    registry: Registry,
    stats: EngineStats,
    next_id: AtomicU64,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("max_concurrent", &self.inner.config.max_concurrent)
            .field("active", &self.inner.registry.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let resolver = BinaryResolver::new(config.search_paths.iter().cloned());
        let limiter = ConcurrencyLimiter::new(config.max_concurrent);
        info!(
            max_concurrent = config.max_concurrent,
            default_timeout = ?config.default_timeout,
            grace = ?config.grace_period,
            "engine created"
        );
        Self {
            inner: Arc::new(EngineInner {
                config,
                resolver,
                limiter,
                registry: Registry::new(),
                stats: EngineStats::default(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn resolver(&self) -> &BinaryResolver {
        &self.inner.resolver
    }

    /// Locate `name` on `PATH` or the configured search paths.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.inner.resolver.resolve(name)
    }

    /// Run `request` to completion.
    ///
    /// The work runs in its own task: dropping this future does not abandon
    /// the child, it is still supervised and reaped.
    pub async fn submit(&self, request: InvocationRequest) -> InvocationResult {
        self.inner.stats.submitted();
        let argv = request.argv().to_vec();
        let inner = Arc::clone(&self.inner);
        match tokio::spawn(execute(inner, request)).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "invocation task failed");
                let result =
                    InvocationResult::spawn_failed(argv, format!("task failed: {e}"), Duration::ZERO);
                self.inner.stats.record(&result);
                result
            }
        }
    }

    /// Resolve `tool` and run it with `args`.
    ///
    /// A missing tool yields a not-found result without spawning anything.
    /// Only a malformed request (e.g. zero timeout) is an error.
    pub async fn run_tool<I, S>(
        &self,
        tool: &str,
        args: I,
        timeout: Option<Duration>,
    ) -> Result<InvocationResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = std::iter::once(tool.to_string())
            .chain(args.into_iter().map(Into::into))
            .collect();
        let mut request = InvocationRequest::new(argv)?;
        if let Some(timeout) = timeout {
            request = request.with_timeout(timeout)?;
        }

        let Some(path) = self.resolve(tool) else {
            warn!(tool, "tool not found in PATH");
            return Ok(self.report_missing(request.argv().to_vec()));
        };

        let request = request.with_program(path.to_string_lossy().into_owned());
        Ok(self.submit(request).await)
    }

    /// Run all `requests` concurrently (bounded by the limiter) and return
    /// their results in input order.
    pub async fn run_many(&self, requests: Vec<InvocationRequest>) -> Vec<InvocationResult> {
        let handles: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let engine = self.clone();
                tokio::spawn(async move { engine.submit(request).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(error = %e, "batch member task failed");
                    results.push(InvocationResult::spawn_failed(
                        Vec::new(),
                        format!("task failed: {e}"),
                        Duration::ZERO,
                    ));
                }
            }
        }
        results
    }

    /// Ask a running invocation to stop. Returns false if it is unknown or
    /// already stopping.
    pub fn cancel(&self, id: InvocationId) -> bool {
        let found = self.inner.registry.cancel(id);
        debug!(%id, found, "cancel requested");
        found
    }

    pub fn active_invocations(&self) -> Vec<InvocationSnapshot> {
        self.inner.registry.snapshot()
    }

    pub fn active_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn summary(&self) -> EngineSummary {
        self.inner.stats.summary()
    }

    /// Stop accepting work, cancel everything in flight and wait for it to
    /// be reaped.
    ///
    /// Requests still waiting for a slot resolve as cancelled. Anything
    /// still registered after grace + drain is force-killed.
    pub async fn shutdown(&self) {
        let inner = &self.inner;
        inner.limiter.close();
        let cancelled = inner.registry.cancel_all();
        info!(cancelled, "engine shutting down");

        let wait = inner.config.grace_period + inner.config.drain_timeout + SHUTDOWN_SLACK;
        if tokio::time::timeout(wait, inner.registry.wait_empty())
            .await
            .is_err()
        {
            let pids = inner.registry.pids();
            warn!(?pids, "invocations still active after shutdown wait; killing");
            for pid in pids {
                if let Err(e) = terminate(ProcessTarget::new(pid), true).await {
                    warn!(pid, error = %e, "forced kill failed");
                }
            }
        }
        info!("engine shutdown complete");
    }
}

impl Executor for Engine {
    fn dispatch(&self, request: InvocationRequest) -> DispatchFuture {
        let engine = self.clone();
        Box::pin(async move { engine.submit(request).await })
    }

    fn resolve_tool(&self, name: &str) -> Option<PathBuf> {
        self.resolve(name)
    }

    fn report_missing(&self, argv: Vec<String>) -> InvocationResult {
        self.inner.stats.submitted();
        let result = InvocationResult::not_found(argv, Duration::ZERO);
        self.inner.stats.record(&result);
        result
    }
}

/// Drive one request from admission to a collected result.
async fn execute(inner: Arc<EngineInner>, request: InvocationRequest) -> InvocationResult {
    let result = execute_inner(&inner, request).await;
    inner.stats.record(&result);
    result
}

async fn execute_inner(inner: &EngineInner, request: InvocationRequest) -> InvocationResult {
    let argv = request.argv().to_vec();
    let config = &inner.config;

    let permit = match inner.limiter.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            debug!(cmd = %request.description(), "engine closed before start");
            return InvocationResult::cancelled(
                argv,
                "engine shut down before the command started".to_string(),
                Duration::ZERO,
            );
        }
    };

    let id = InvocationId(inner.next_id.fetch_add(1, Ordering::Relaxed));
    let started = Instant::now();

    let mut launched = match launch(&request, &config.env) {
        Ok(launched) => launched,
        Err(e) => {
            drop(permit);
            return match e.kind {
                SpawnErrorKind::NotFound => {
                    warn!(%id, program = %e.program, "tool not found");
                    InvocationResult::not_found(argv, started.elapsed())
                }
                _ => {
                    warn!(%id, program = %e.program, error = %e.message, "spawn failed");
                    InvocationResult::spawn_failed(argv, e.message, started.elapsed())
                }
            };
        }
    };
    inner.stats.process_started();

    let timeout = request.timeout().unwrap_or(config.default_timeout);
    info!(%id, pid = ?launched.pid, cmd = %request.description(), ?timeout, "started");

    let (cancel_tx, cancel_rx) = oneshot::channel();
    let guard = inner.registry.register(ActiveInvocation::new(
        id,
        launched.pid,
        request.description(),
        argv.clone(),
        cancel_tx,
    ));

    let stdout = OutputCapture::spawn(launched.stdout.take(), "stdout", config.max_output_bytes);
    let stderr = OutputCapture::spawn(launched.stderr.take(), "stderr", config.max_output_bytes);

    let target = launched.pid.map(ProcessTarget::new);
    let supervised = supervise(
        &mut launched.child,
        target,
        timeout,
        config.grace_period,
        cancel_rx,
    )
    .await;
    inner.stats.process_reaped();
    let duration = started.elapsed();
    guard.release();

    let (stdout, stderr) = tokio::join!(
        stdout.finish(config.drain_timeout),
        stderr.finish(config.drain_timeout)
    );
    if (!stdout.complete || !stderr.complete)
        && let Some(target) = target
    {
        // A descendant still holds the pipes open.
        debug!(%id, pgid = target.pgid(), "pipes still open after reap; killing group");
        if let Err(e) = terminate(target, true).await {
            debug!(%id, error = %e, "group kill after drain failed");
        }
    }
    drop(permit);

    collect(
        argv,
        supervised.state,
        supervised.status,
        stdout,
        stderr,
        duration,
        timeout,
    )
}
