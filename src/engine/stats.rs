// src/engine/stats.rs

//! Counters kept by the engine for the end-of-run summary.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::exec::InvocationResult;
use crate::types::Outcome;

#[derive(Debug)]
pub struct EngineStats {
    started: Instant,
    submitted: AtomicU64,
    active: AtomicUsize,
    peak_active: AtomicUsize,
    succeeded: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
    not_found: AtomicU64,
    spawn_failed: AtomicU64,
}

/// Snapshot of [`EngineStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSummary {
    pub total_execution_time: Duration,
    pub submitted: u64,
    pub active: usize,
    pub peak_active: usize,
    pub succeeded: u64,
    /// Ran to completion with a non-zero exit code.
    pub failed: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    pub not_found: u64,
    pub spawn_failed: u64,
}

impl Default for EngineStats {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            submitted: AtomicU64::new(0),
            active: AtomicUsize::new(0),
            peak_active: AtomicUsize::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            spawn_failed: AtomicU64::new(0),
        }
    }
}

impl EngineStats {
    pub fn submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// A child was spawned.
    pub fn process_started(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now, Ordering::SeqCst);
    }

    /// A child was reaped.
    pub fn process_reaped(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Count a finished invocation under its outcome.
    pub fn record(&self, result: &InvocationResult) {
        let counter = match result.outcome {
            Outcome::Completed if result.success() => &self.succeeded,
            Outcome::Completed => &self.failed,
            Outcome::TimedOut => &self.timed_out,
            Outcome::Cancelled => &self.cancelled,
            Outcome::NotFound => &self.not_found,
            Outcome::SpawnFailed => &self.spawn_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            total_execution_time: self.started.elapsed(),
            submitted: self.submitted.load(Ordering::Relaxed),
            active: self.active.load(Ordering::SeqCst),
            peak_active: self.peak_active.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            spawn_failed: self.spawn_failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_tracks_high_water_mark() {
        let stats = EngineStats::default();
        stats.process_started();
        stats.process_started();
        stats.process_reaped();
        stats.process_started();
        stats.process_reaped();
        stats.process_reaped();

        let s = stats.summary();
        assert_eq!(s.peak_active, 2);
        assert_eq!(s.active, 0);
    }

    #[test]
    fn results_are_counted_by_outcome() {
        let stats = EngineStats::default();
        stats.record(&InvocationResult::not_found(vec!["x".into()], Duration::ZERO));
        stats.record(&InvocationResult::spawn_failed(
            vec!["x".into()],
            "EPERM".into(),
            Duration::ZERO,
        ));

        let s = stats.summary();
        assert_eq!(s.not_found, 1);
        assert_eq!(s.spawn_failed, 1);
        assert_eq!(s.succeeded, 0);
    }
}
