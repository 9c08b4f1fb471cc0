// src/exec/mod.rs

//! Process execution layer.
//!
//! Leaves of the engine, each usable on its own:
//!
//! - [`resolver`]: tool name → executable path (`which`).
//! - [`launcher`]: spawn one child in its own process group.
//! - [`limiter`]: counting-semaphore admission control.
//! - [`state`]: pure per-invocation state machine.
//! - [`supervisor`]: async timeout / cancel driver around [`state`].
//! - [`signal`]: graceful / forceful process-group termination per OS.
//! - [`capture`] and [`collector`]: drain pipes, build the final result.
//! - [`registry`]: table of in-flight invocations.
//! - [`backend`]: the `Executor` trait the batch runner dispatches through.

pub mod backend;
pub mod capture;
pub mod collector;
pub mod launcher;
pub mod limiter;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod result;
pub mod signal;
pub mod state;
pub mod supervisor;

pub use backend::{DispatchFuture, Executor};
pub use launcher::{SpawnError, SpawnErrorKind};
pub use limiter::{ConcurrencyLimiter, LimiterClosed, Permit};
pub use registry::{InvocationId, InvocationSnapshot, Registry};
pub use request::InvocationRequest;
pub use resolver::BinaryResolver;
pub use result::InvocationResult;
pub use state::InvocationState;
