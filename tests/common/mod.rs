#![allow(dead_code)]

pub use reconrun_test_utils::builders;
pub use reconrun_test_utils::{init_tracing, with_timeout};

use std::time::Duration;

use reconrun::engine::{Engine, EngineConfig};
use reconrun::exec::InvocationRequest;

/// Engine with a short grace window so stop paths finish quickly.
pub fn fast_engine(max_concurrent: usize) -> Engine {
    Engine::new(
        EngineConfig::default()
            .with_max_concurrent(max_concurrent)
            .with_grace_period(Duration::from_millis(500))
            .with_drain_timeout(Duration::from_millis(500)),
    )
}

pub fn cmd(argv: &[&str], timeout: Duration) -> InvocationRequest {
    InvocationRequest::new(argv.iter().copied())
        .unwrap()
        .with_timeout(timeout)
        .unwrap()
}

/// `sh -c script` with a timeout.
pub fn sh(script: &str, timeout: Duration) -> InvocationRequest {
    cmd(&["sh", "-c", script], timeout)
}

/// Lines of a replay script that would actually run something.
pub fn executable_lines(script: &str) -> Vec<&str> {
    script
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}
