// src/exec/collector.rs

//! Result collection: the single place where a supervised run becomes a
//! public [`InvocationResult`].

use std::process::ExitStatus;
use std::time::Duration;

use tracing::{info, warn};

use super::capture::CapturedOutput;
use super::result::InvocationResult;
use super::state::InvocationState;
use crate::types::{
    CANCELLED_EXIT_CODE, Outcome, StopCause, TIMEOUT_EXIT_CODE, UNKNOWN_EXIT_CODE,
};

/// Build the result for a run that reached `state`.
///
/// - `Completed`: the OS exit status (or `128 + signal` on unix when the
///   child was killed by someone else).
/// - stopped on timeout: `timed_out = true`, return code 124.
/// - stopped on cancel: return code 130.
pub fn collect(
    argv: Vec<String>,
    state: InvocationState,
    status: Option<ExitStatus>,
    stdout: CapturedOutput,
    stderr: CapturedOutput,
    duration: Duration,
    timeout: Duration,
) -> InvocationResult {
    debug_assert!(state.is_terminal(), "collect called before a terminal state");

    let (return_code, outcome) = match state.stop_cause() {
        None => (exit_code(status), Outcome::Completed),
        Some(StopCause::Timeout) => (TIMEOUT_EXIT_CODE, Outcome::TimedOut),
        Some(StopCause::Cancelled) => (CANCELLED_EXIT_CODE, Outcome::Cancelled),
    };

    let result = InvocationResult {
        argv,
        return_code,
        stdout: stdout.text,
        stderr: stderr.text,
        timed_out: outcome == Outcome::TimedOut,
        duration,
        timeout: Some(timeout),
        outcome,
        termination: state.termination(),
    };

    if result.success() {
        info!(
            program = %result.argv[0],
            exit_code = result.return_code,
            duration_ms = result.duration.as_millis() as u64,
            "process exited"
        );
    } else {
        warn!(
            program = %result.argv[0],
            exit_code = result.return_code,
            outcome = %result.outcome,
            termination = ?result.termination,
            duration_ms = result.duration.as_millis() as u64,
            "process did not succeed"
        );
    }

    result
}

/// Map an exit status to an integer return code.
pub fn exit_code(status: Option<ExitStatus>) -> i32 {
    let Some(status) = status else {
        return UNKNOWN_EXIT_CODE;
    };
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_EXIT_CODE
}
