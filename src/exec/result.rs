// src/exec/result.rs

//! The immutable outcome of one invocation.

use std::time::Duration;

use serde::Serialize;

use crate::types::{
    CANCELLED_EXIT_CODE, NOT_FOUND_EXIT_CODE, Outcome, SPAWN_FAILED_EXIT_CODE, Termination,
};

/// Result of running one external command.
///
/// Produced exactly once per submitted request by the result collector.
/// `success()` is derived: it holds iff `return_code == 0 && !timed_out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    pub argv: Vec<String>,
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub duration: Duration,
    /// Deadline the process ran under. `None` when it never started.
    pub timeout: Option<Duration>,
    pub outcome: Outcome,
    /// Set when the supervisor had to stop the process.
    pub termination: Option<Termination>,
}

impl InvocationResult {
    /// Result for a tool that could not be located.
    pub fn not_found(argv: Vec<String>, duration: Duration) -> Self {
        let stderr = format!(
            "Tool '{}' not found in PATH",
            argv.first().map(String::as_str).unwrap_or_default()
        );
        Self {
            argv,
            return_code: NOT_FOUND_EXIT_CODE,
            stdout: String::new(),
            stderr,
            timed_out: false,
            duration,
            timeout: None,
            outcome: Outcome::NotFound,
            termination: None,
        }
    }

    /// Result for a process the OS refused to create.
    pub fn spawn_failed(argv: Vec<String>, message: String, duration: Duration) -> Self {
        Self {
            argv,
            return_code: SPAWN_FAILED_EXIT_CODE,
            stdout: String::new(),
            stderr: message,
            timed_out: false,
            duration,
            timeout: None,
            outcome: Outcome::SpawnFailed,
            termination: None,
        }
    }

    /// Result for a request that was cancelled before it could be spawned
    /// (e.g. still waiting for a slot when the engine shut down).
    pub fn cancelled(argv: Vec<String>, message: String, duration: Duration) -> Self {
        Self {
            argv,
            return_code: CANCELLED_EXIT_CODE,
            stdout: String::new(),
            stderr: message,
            timed_out: false,
            duration,
            timeout: None,
            outcome: Outcome::Cancelled,
            termination: None,
        }
    }

    pub fn success(&self) -> bool {
        self.return_code == 0 && !self.timed_out
    }

    /// Combined stdout followed by stderr.
    pub fn output(&self) -> String {
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len());
        out.push_str(&self.stdout);
        out.push_str(&self.stderr);
        out
    }

    /// Non-empty, trimmed stdout lines. Most recon tools emit one finding
    /// per line.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    /// Human-readable reason for a non-success result, `None` on success.
    pub fn failure_reason(&self) -> Option<String> {
        if self.success() {
            return None;
        }
        let reason = match self.outcome {
            Outcome::TimedOut => format!("timeout after {}", self.deadline_text()),
            Outcome::NotFound => "tool not found".to_string(),
            Outcome::SpawnFailed => {
                let msg = self.stderr.lines().next().unwrap_or("unknown error");
                format!("spawn failed: {msg}")
            }
            Outcome::Cancelled => "cancelled".to_string(),
            Outcome::Completed => format!("exit code {}", self.return_code),
        };
        Some(reason)
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        match self.outcome {
            Outcome::TimedOut => format!(
                "timeout after {} (stopped at {:.1}s)",
                self.deadline_text(),
                self.duration.as_secs_f64()
            ),
            Outcome::Completed if self.success() => format!(
                "ok in {:.1}s ({} bytes output)",
                self.duration.as_secs_f64(),
                self.stdout.len()
            ),
            _ => format!(
                "{} (exit code {}, {:.1}s)",
                self.outcome,
                self.return_code,
                self.duration.as_secs_f64()
            ),
        }
    }

    fn deadline_text(&self) -> String {
        format_deadline(self.timeout.unwrap_or(self.duration))
    }
}

/// `600s`, `1.5s`, or `500ms` below one second.
fn format_deadline(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TIMEOUT_EXIT_CODE;

    fn completed(code: i32) -> InvocationResult {
        InvocationResult {
            argv: vec!["tool".to_string()],
            return_code: code,
            stdout: " a.example.com \n\nb.example.com\n".to_string(),
            stderr: "warn\n".to_string(),
            timed_out: false,
            duration: Duration::from_millis(1500),
            timeout: Some(Duration::from_secs(5)),
            outcome: Outcome::Completed,
            termination: None,
        }
    }

    #[test]
    fn lines_are_trimmed_and_non_empty() {
        assert_eq!(completed(0).lines(), vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn output_concatenates_streams() {
        assert!(completed(0).output().ends_with("b.example.com\nwarn\n"));
    }

    #[test]
    fn failure_reasons_name_the_cause() {
        assert_eq!(completed(0).failure_reason(), None);
        assert_eq!(completed(2).failure_reason().as_deref(), Some("exit code 2"));

        let nf = InvocationResult::not_found(vec!["nope".into()], Duration::ZERO);
        assert_eq!(nf.failure_reason().as_deref(), Some("tool not found"));
        assert_eq!(nf.return_code, NOT_FOUND_EXIT_CODE);
        assert!(nf.stderr.contains("nope"));

        let mut to = completed(TIMEOUT_EXIT_CODE);
        to.timed_out = true;
        to.outcome = Outcome::TimedOut;
        to.timeout = Some(Duration::from_secs(600));
        to.duration = Duration::from_millis(610_400);
        assert_eq!(to.failure_reason().as_deref(), Some("timeout after 600s"));
    }

    #[test]
    fn timeout_reason_reports_the_deadline_not_the_elapsed_time() {
        let mut to = completed(TIMEOUT_EXIT_CODE);
        to.timed_out = true;
        to.outcome = Outcome::TimedOut;

        to.timeout = Some(Duration::from_millis(500));
        to.duration = Duration::from_millis(2100);
        assert_eq!(to.failure_reason().as_deref(), Some("timeout after 500ms"));

        to.timeout = Some(Duration::from_millis(1500));
        assert_eq!(to.failure_reason().as_deref(), Some("timeout after 1.5s"));
        assert!(to.summary().starts_with("timeout after 1.5s (stopped at 2.1s)"));
    }

    #[test]
    fn spawn_failure_reason_uses_first_stderr_line() {
        let r = InvocationResult::spawn_failed(
            vec!["x".into()],
            "permission denied\nmore".to_string(),
            Duration::ZERO,
        );
        assert_eq!(
            r.failure_reason().as_deref(),
            Some("spawn failed: permission denied")
        );
    }
}
