// src/exec/request.rs

//! Immutable description of one invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ReconrunError, Result};

/// What to run, and under which limits.
///
/// Built once by a caller right before submission and never mutated by the
/// engine. The `with_*` methods consume and return the request so a request
/// can be assembled in one expression:
///
/// ```
/// use std::time::Duration;
/// use reconrun::exec::InvocationRequest;
///
/// let req = InvocationRequest::new(["subfinder", "-d", "example.com"])?
///     .with_timeout(Duration::from_secs(600))?
///     .with_description("Passive subdomain discovery");
/// assert_eq!(req.program(), "subfinder");
/// # Ok::<(), reconrun::errors::ReconrunError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    argv: Vec<String>,
    timeout: Option<Duration>,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, String>,
    description: String,
    stdin: Option<Vec<u8>>,
}

impl InvocationRequest {
    /// Create a request for `argv` (program followed by its arguments).
    ///
    /// An empty argv or an empty program name is a programmer error and is
    /// rejected here, so the engine never has to deal with it.
    pub fn new<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        match argv.first() {
            None => {
                return Err(ReconrunError::InvalidRequest(
                    "argv must contain at least the program".to_string(),
                ));
            }
            Some(program) if program.trim().is_empty() => {
                return Err(ReconrunError::InvalidRequest(
                    "program name must not be empty".to_string(),
                ));
            }
            Some(_) => {}
        }

        let description = argv.join(" ");
        Ok(Self {
            argv,
            timeout: None,
            cwd: None,
            env: BTreeMap::new(),
            description,
            stdin: None,
        })
    }

    /// Override the engine's default timeout for this invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(ReconrunError::InvalidRequest(format!(
                "timeout for '{}' must be greater than zero",
                self.description
            )));
        }
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add environment overrides on top of the inherited environment.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Bytes written to the child's stdin right after spawn. Without this the
    /// child gets a null stdin.
    pub fn with_stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Replace the program (first argv element), keeping the arguments.
    /// Used after resolving a logical tool name to a full path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.argv[0] = program.into();
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stdin(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }
}
