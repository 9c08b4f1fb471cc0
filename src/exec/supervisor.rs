// src/exec/supervisor.rs

//! Timeout & cancellation supervisor: the async driver around
//! [`InvocationState`].
//!
//! It races "child exited" against "deadline elapsed" and "cancel
//! requested". On a stop it runs the fixed policy:
//! 1. graceful signal to the process group,
//! 2. wait up to the grace window,
//! 3. forceful signal to the group and reap.
//!
//! It always returns with the child reaped, after at most
//! `timeout + grace` plus the time the OS takes to deliver SIGKILL.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::signal::{self, ProcessTarget};
use super::state::{InvocationState, SupervisorEvent};

/// Where supervision ended.
#[derive(Debug, Clone, Copy)]
pub struct Supervised {
    pub state: InvocationState,
    pub status: Option<ExitStatus>,
}

/// Supervise `child` until it is reaped.
///
/// `cancel_rx` firing is treated like an early deadline. A dropped cancel
/// sender is not a cancellation.
pub async fn supervise(
    child: &mut Child,
    target: Option<ProcessTarget>,
    timeout: Duration,
    grace: Duration,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Supervised {
    let mut state = InvocationState::Running;
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);
    let mut cancel_armed = true;

    let stop_event = loop {
        tokio::select! {
            res = child.wait() => {
                state = state.on(SupervisorEvent::ProcessExited);
                return Supervised { state, status: waited(res, target) };
            }
            _ = &mut deadline => break SupervisorEvent::DeadlineElapsed,
            res = &mut cancel_rx, if cancel_armed => match res {
                Ok(()) => break SupervisorEvent::CancelRequested,
                Err(_) => cancel_armed = false,
            },
        }
    };

    state = state.on(stop_event);
    info!(
        pid = ?target.map(|t| t.pid()),
        cause = ?state.stop_cause(),
        timeout_ms = timeout.as_millis() as u64,
        "stopping process group"
    );
    send_stop(child, target, false).await;

    let status = match tokio::time::timeout(grace, child.wait()).await {
        Ok(res) => {
            state = state.on(SupervisorEvent::ProcessExited);
            debug!(pid = ?target.map(|t| t.pid()), "process group exited within grace window");
            waited(res, target)
        }
        Err(_) => {
            state = state.on(SupervisorEvent::GraceElapsed);
            warn!(
                pid = ?target.map(|t| t.pid()),
                grace_ms = grace.as_millis() as u64,
                "grace window elapsed; killing process group"
            );
            send_stop(child, target, true).await;
            let res = child.wait().await;
            state = state.on(SupervisorEvent::ProcessExited);
            waited(res, target)
        }
    };

    debug_assert!(state.is_terminal());
    Supervised { state, status }
}

/// Signal the process group, falling back to the child alone when the group
/// signal cannot be delivered.
async fn send_stop(child: &mut Child, target: Option<ProcessTarget>, forceful: bool) {
    if let Some(target) = target {
        match signal::terminate(target, forceful).await {
            Ok(()) => return,
            Err(e) => warn!(
                pid = target.pid(),
                forceful,
                error = %e,
                "signalling process group failed; falling back to the child"
            ),
        }
    }

    if forceful || target.is_none() {
        if let Err(e) = child.start_kill() {
            debug!(error = %e, "start_kill failed (child likely already exited)");
        }
    }
}

fn waited(res: std::io::Result<ExitStatus>, target: Option<ProcessTarget>) -> Option<ExitStatus> {
    match res {
        Ok(status) => Some(status),
        Err(e) => {
            warn!(pid = ?target.map(|t| t.pid()), error = %e, "waiting for child failed");
            None
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::Stdio;
    use std::time::Instant;

    use tokio::process::Command;

    use super::*;
    use crate::types::StopCause;

    fn spawn_sh(script: &str) -> (Child, Option<ProcessTarget>) {
        let child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdout(Stdio::null())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let target = child.id().map(ProcessTarget::new);
        (child, target)
    }

    #[tokio::test]
    async fn quick_exit_completes() {
        let (mut child, target) = spawn_sh("exit 3");
        let (_tx, rx) = oneshot::channel();
        let out = supervise(&mut child, target, Duration::from_secs(5), Duration::from_secs(1), rx).await;
        assert_eq!(out.state, InvocationState::Completed);
        assert_eq!(out.status.and_then(|s| s.code()), Some(3));
    }

    #[tokio::test]
    async fn deadline_terminates_gracefully() {
        let (mut child, target) = spawn_sh("sleep 30");
        let (_tx, rx) = oneshot::channel();
        let started = Instant::now();
        let out = supervise(&mut child, target, Duration::from_millis(200), Duration::from_secs(5), rx).await;
        assert_eq!(out.state, InvocationState::Terminated(StopCause::Timeout));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn ignored_sigterm_escalates_to_kill() {
        let (mut child, target) = spawn_sh("trap '' TERM; sleep 30");
        let (_tx, rx) = oneshot::channel();
        let started = Instant::now();
        let out = supervise(&mut child, target, Duration::from_millis(200), Duration::from_millis(300), rx).await;
        assert_eq!(out.state, InvocationState::Killed(StopCause::Timeout));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn cancel_stops_before_deadline() {
        let (mut child, target) = spawn_sh("sleep 30");
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = tx.send(());
        });
        let out = supervise(&mut child, target, Duration::from_secs(60), Duration::from_secs(5), rx).await;
        assert_eq!(out.state.stop_cause(), Some(StopCause::Cancelled));
    }

    #[tokio::test]
    async fn dropped_cancel_sender_is_not_a_cancel() {
        let (mut child, target) = spawn_sh("sleep 0.2; exit 0");
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);
        let out = supervise(&mut child, target, Duration::from_secs(5), Duration::from_secs(1), rx).await;
        assert_eq!(out.state, InvocationState::Completed);
    }
}
