// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The batch runner talks to an `Executor` instead of the engine directly.
//! This makes it easy to swap in a fake executor in tests while keeping the
//! production implementation in [`crate::engine::Engine`].

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use super::request::InvocationRequest;
use super::result::InvocationResult;

/// Boxed, `'static` future returned by [`Executor::dispatch`], so callers
/// can hand it straight to `tokio::spawn`.
pub type DispatchFuture = Pin<Box<dyn Future<Output = InvocationResult> + Send + 'static>>;

/// Trait abstracting how invocation requests are executed.
pub trait Executor: Send + Sync {
    /// Run `request` to a terminal state.
    ///
    /// Must never fail: every expected failure is encoded in the result.
    fn dispatch(&self, request: InvocationRequest) -> DispatchFuture;

    /// Locate a tool by logical name.
    fn resolve_tool(&self, name: &str) -> Option<PathBuf>;

    /// Result for a request whose tool [`resolve_tool`](Self::resolve_tool)
    /// could not find. Executors that keep counters account for it here.
    fn report_missing(&self, argv: Vec<String>) -> InvocationResult {
        InvocationResult::not_found(argv, Duration::ZERO)
    }
}
