// src/engine/mod.rs

//! Execution engine for reconrun.
//!
//! This module ties together the leaves in [`crate::exec`]:
//! - admission through the concurrency limiter
//! - launch, supervision and result collection per invocation
//! - the active-invocation registry used for cancel and shutdown
//!
//! [`runtime::Engine`] is the async shell that owns those pieces; the
//! per-invocation semantics live in the pure state machine in
//! [`crate::exec::state`]. [`batch::BatchRunner`] runs named jobs through
//! any [`crate::exec::Executor`] and feeds the manual log.

pub mod batch;
pub mod config;
pub mod runtime;
pub mod stats;

pub use batch::{BatchRunner, Job, JobReport};
pub use config::EngineConfig;
pub use runtime::Engine;
pub use stats::{EngineStats, EngineSummary};
