// src/exec/signal.rs

//! Platform-specific termination of a whole process group.
//!
//! The launcher puts every child in its own group (pgid == pid on unix), so
//! one signal reaches a shell wrapper and everything it started.
//! - unix: `kill(-pgid, SIGTERM | SIGKILL)`
//! - windows: `taskkill /T` (tree), with `/F` when forceful

use std::io;

/// The process (group) a stop signal is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessTarget {
    pid: u32,
}

impl ProcessTarget {
    pub fn new(pid: u32) -> Self {
        Self { pid }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Process-group id. Children are spawned as group leaders.
    pub fn pgid(&self) -> u32 {
        self.pid
    }
}

/// Ask (`forceful = false`) or force (`forceful = true`) the target's whole
/// process group to exit. A group that no longer exists is not an error.
#[cfg(unix)]
pub async fn terminate(target: ProcessTarget, forceful: bool) -> io::Result<()> {
    let signal = if forceful { libc::SIGKILL } else { libc::SIGTERM };
    let pgid = target.pgid() as libc::pid_t;

    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(-pgid, signal) };
    if rc == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(windows)]
pub async fn terminate(target: ProcessTarget, forceful: bool) -> io::Result<()> {
    use std::process::Stdio;

    let mut cmd = tokio::process::Command::new("taskkill");
    cmd.arg("/PID")
        .arg(target.pid().to_string())
        .arg("/T")
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if forceful {
        cmd.arg("/F");
    }

    let status = cmd.status().await?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("taskkill exited with {status}")))
    }
}
