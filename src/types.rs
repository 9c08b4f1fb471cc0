// src/types.rs

//! Small value types shared between the execution layer, the engine and
//! the manual-command log.

use std::fmt;

use serde::Serialize;

/// Return code reported when an invocation hit its deadline.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Return code reported when the program could not be spawned for a reason
/// other than "not found" (permissions, resource limits, ...).
pub const SPAWN_FAILED_EXIT_CODE: i32 = 126;

/// Return code reported when the tool could not be located.
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

/// Return code reported when an invocation was cancelled (shutdown or an
/// explicit [`crate::engine::Engine::cancel`]).
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// Return code used when the OS gave us nothing to report.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// How an invocation ended, as seen by callers.
///
/// - `Completed`: the process exited on its own; the return code may still
///   be non-zero.
/// - `TimedOut`: the deadline elapsed and the process group was stopped.
/// - `Cancelled`: stopped on request before its deadline.
/// - `NotFound`: the tool is not installed / not on the search path.
/// - `SpawnFailed`: the OS refused to create the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    TimedOut,
    Cancelled,
    NotFound,
    SpawnFailed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Completed => "completed",
            Outcome::TimedOut => "timed_out",
            Outcome::Cancelled => "cancelled",
            Outcome::NotFound => "not_found",
            Outcome::SpawnFailed => "spawn_failed",
        };
        f.write_str(s)
    }
}

/// Why the supervisor started stopping a running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCause {
    Timeout,
    Cancelled,
}

/// Which step of the stop sequence actually ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The process group exited within the grace window after SIGTERM.
    Graceful,
    /// The grace window elapsed and the group was SIGKILLed.
    Forced,
}
