// src/exec/registry.rs

//! Table of in-flight invocations.
//!
//! Every spawned child is registered until it has been reaped. The table is
//! what shutdown walks to cancel everything, and what `Engine::cancel`
//! uses to reach a single invocation. One `std::sync::Mutex` guards it; the
//! lock is never held across an `.await`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{Notify, oneshot};
use tracing::debug;

/// Engine-unique invocation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InvocationId(pub u64);

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for one running child.
#[derive(Debug)]
pub struct ActiveInvocation {
    pub id: InvocationId,
    pub pid: Option<u32>,
    pub started: Instant,
    pub description: String,
    pub argv: Vec<String>,
    cancel: Option<oneshot::Sender<()>>,
}

impl ActiveInvocation {
    pub fn new(
        id: InvocationId,
        pid: Option<u32>,
        description: impl Into<String>,
        argv: Vec<String>,
        cancel: oneshot::Sender<()>,
    ) -> Self {
        Self {
            id,
            pid,
            started: Instant::now(),
            description: description.into(),
            argv,
            cancel: Some(cancel),
        }
    }

    /// Fire the cancel signal. Returns false if it was already fired or the
    /// supervisor is gone.
    fn request_cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

/// Point-in-time view of an active invocation, safe to hand out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationSnapshot {
    pub id: InvocationId,
    pub pid: Option<u32>,
    pub description: String,
    pub argv: Vec<String>,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: HashMap<InvocationId, ActiveInvocation>,
    /// Set by `cancel_all`; late registrations are cancelled on arrival.
    closed: bool,
}

#[derive(Debug, Default)]
struct RegistryInner {
    state: Mutex<RegistryState>,
    emptied: Notify,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

/// Removes its entry from the registry when released or dropped.
///
/// The owning supervisor calls [`RegistrationGuard::release`] once the
/// child is reaped; the `Drop` impl covers unwinding.
#[derive(Debug)]
pub struct RegistrationGuard {
    registry: Registry,
    id: InvocationId,
}

impl RegistrationGuard {
    pub fn id(&self) -> InvocationId {
        self.id
    }

    pub fn release(self) {
        // Drop does the work.
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert `entry`. If the registry has been closed by `cancel_all`, the
    /// entry is cancelled immediately.
    pub fn register(&self, mut entry: ActiveInvocation) -> RegistrationGuard {
        let id = entry.id;
        let mut state = self.state();
        if state.closed {
            debug!(%id, "registered after shutdown; cancelling immediately");
            entry.request_cancel();
        }
        state.entries.insert(id, entry);
        drop(state);

        RegistrationGuard {
            registry: self.clone(),
            id,
        }
    }

    fn remove(&self, id: InvocationId) {
        let mut state = self.state();
        if state.entries.remove(&id).is_some() {
            debug!(%id, "invocation removed from registry");
        }
        let now_empty = state.entries.is_empty();
        drop(state);

        if now_empty {
            self.inner.emptied.notify_waiters();
        }
    }

    /// Request cancellation of one invocation.
    pub fn cancel(&self, id: InvocationId) -> bool {
        self.state()
            .entries
            .get_mut(&id)
            .map(ActiveInvocation::request_cancel)
            .unwrap_or(false)
    }

    /// Cancel everything currently registered and everything registered
    /// from now on. Returns how many invocations were signalled.
    pub fn cancel_all(&self) -> usize {
        let mut state = self.state();
        state.closed = true;
        state
            .entries
            .values_mut()
            .map(ActiveInvocation::request_cancel)
            .filter(|sent| *sent)
            .count()
    }

    pub fn snapshot(&self) -> Vec<InvocationSnapshot> {
        let mut snaps: Vec<_> = self
            .state()
            .entries
            .values()
            .map(|e| InvocationSnapshot {
                id: e.id,
                pid: e.pid,
                description: e.description.clone(),
                argv: e.argv.clone(),
                elapsed: e.started.elapsed(),
            })
            .collect();
        snaps.sort_by_key(|s| s.id);
        snaps
    }

    /// Pids of every registered child (for last-resort kills).
    pub fn pids(&self) -> Vec<u32> {
        self.state().entries.values().filter_map(|e| e.pid).collect()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve once no invocation is registered.
    pub async fn wait_empty(&self) {
        loop {
            // Created before the check so a removal in between is not missed.
            let notified = self.inner.emptied.notified();
            if self.is_empty() {
                return;
            }
            notified.await;
        }
    }
}
