// src/exec/launcher.rs

//! Process launcher.
//!
//! Spawns one child in a fresh process group so the supervisor can later
//! signal the whole subtree (e.g. a shell wrapper plus the real binary) at
//! once. Never waits for the child.

use std::collections::BTreeMap;
use std::io;
use std::process::Stdio;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::debug;

use super::request::InvocationRequest;

#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// Broad classes of spawn failure callers may want to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnErrorKind {
    /// The executable vanished between resolution and spawn.
    NotFound,
    PermissionDenied,
    /// Too many processes or open files.
    ResourceExhausted,
    Other,
}

#[derive(Debug, Error)]
#[error("failed to spawn '{program}': {message}")]
pub struct SpawnError {
    pub program: String,
    pub kind: SpawnErrorKind,
    pub message: String,
}

impl SpawnError {
    fn from_io(program: &str, err: &io::Error) -> Self {
        Self {
            program: program.to_string(),
            kind: classify(err),
            message: err.to_string(),
        }
    }
}

fn classify(err: &io::Error) -> SpawnErrorKind {
    match err.kind() {
        io::ErrorKind::NotFound => return SpawnErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => return SpawnErrorKind::PermissionDenied,
        _ => {}
    }

    #[cfg(unix)]
    if let Some(code) = err.raw_os_error()
        && matches!(code, libc::EAGAIN | libc::EMFILE | libc::ENFILE | libc::ENOMEM)
    {
        return SpawnErrorKind::ResourceExhausted;
    }

    SpawnErrorKind::Other
}

/// A freshly spawned child together with its output pipes.
#[derive(Debug)]
pub struct LaunchedProcess {
    pub child: Child,
    /// OS pid captured at spawn; `Child::id` stops reporting it once the
    /// child has been reaped.
    pub pid: Option<u32>,
    pub stdout: Option<ChildStdout>,
    pub stderr: Option<ChildStderr>,
}

/// Spawn `request` without waiting for it.
///
/// `base_env` (engine-wide overrides) is applied first, then the request's
/// own overrides; both sit on top of the inherited environment.
pub fn launch(
    request: &InvocationRequest,
    base_env: &BTreeMap<String, String>,
) -> Result<LaunchedProcess, SpawnError> {
    let program = request.program();

    if let Some(cwd) = request.cwd()
        && !cwd.is_dir()
    {
        return Err(SpawnError {
            program: program.to_string(),
            kind: SpawnErrorKind::Other,
            message: format!("working directory {} does not exist", cwd.display()),
        });
    }

    let mut cmd = Command::new(program);
    cmd.args(request.args())
        .envs(base_env)
        .envs(request.env())
        .stdin(if request.stdin().is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(cwd) = request.cwd() {
        cmd.current_dir(cwd);
    }

    #[cfg(unix)]
    cmd.process_group(0);

    #[cfg(windows)]
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);

    let mut child = cmd
        .spawn()
        .map_err(|e| SpawnError::from_io(program, &e))?;

    let pid = child.id();
    debug!(?pid, program, "spawned child in new process group");

    if let Some(input) = request.stdin() {
        feed_stdin(&mut child, input.to_vec());
    }

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    Ok(LaunchedProcess {
        child,
        pid,
        stdout,
        stderr,
    })
}

/// Write `input` to the child's stdin in the background, then close it so
/// the child sees EOF.
fn feed_stdin(child: &mut Child, input: Vec<u8>) {
    let Some(mut stdin) = child.stdin.take() else {
        return;
    };
    tokio::spawn(async move {
        if let Err(e) = stdin.write_all(&input).await {
            // Children that exit without reading stdin produce EPIPE here.
            debug!(error = %e, "writing child stdin failed");
        }
        drop(stdin);
    });
}
