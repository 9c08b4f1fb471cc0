use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reconrun::exec::{DispatchFuture, Executor, InvocationRequest, InvocationResult};
use reconrun::types::{Outcome, TIMEOUT_EXIT_CODE};
use tracing::debug;

/// What the fake should answer for a given program.
#[derive(Debug, Clone)]
pub enum Scripted {
    Exit { code: i32, stdout: String },
    Timeout,
}

/// A fake executor that:
/// - "resolves" only the tools it was told about (to `/fake/bin/<name>`)
/// - records the argv of every dispatched request
/// - answers each request from a script keyed by tool name, defaulting to
///   a successful empty run
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    installed: BTreeSet<String>,
    script: BTreeMap<String, Scripted>,
    delay: Option<Duration>,
    dispatched: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, name: &str) -> Self {
        self.installed.insert(name.to_string());
        self
    }

    pub fn with_result(mut self, name: &str, scripted: Scripted) -> Self {
        self.installed.insert(name.to_string());
        self.script.insert(name.to_string(), scripted);
        self
    }

    pub fn with_exit(self, name: &str, code: i32) -> Self {
        self.with_result(
            name,
            Scripted::Exit {
                code,
                stdout: String::new(),
            },
        )
    }

    pub fn with_stdout(self, name: &str, stdout: &str) -> Self {
        self.with_result(
            name,
            Scripted::Exit {
                code: 0,
                stdout: stdout.to_string(),
            },
        )
    }

    /// Sleep this long inside every dispatch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Argv of every dispatched request, in dispatch order.
    pub fn dispatched(&self) -> Vec<Vec<String>> {
        self.dispatched.lock().unwrap().clone()
    }

    fn tool_name(program: &str) -> String {
        program.rsplit('/').next().unwrap_or(program).to_string()
    }
}

impl Executor for FakeExecutor {
    fn dispatch(&self, request: InvocationRequest) -> DispatchFuture {
        let argv = request.argv().to_vec();
        let timeout = request.timeout();
        self.dispatched.lock().unwrap().push(argv.clone());

        let scripted = self
            .script
            .get(&Self::tool_name(request.program()))
            .cloned()
            .unwrap_or(Scripted::Exit {
                code: 0,
                stdout: String::new(),
            });
        let delay = self.delay;
        debug!(?argv, ?scripted, "fake dispatch");

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let (return_code, stdout, timed_out, outcome) = match scripted {
                Scripted::Exit { code, stdout } => (code, stdout, false, Outcome::Completed),
                Scripted::Timeout => (TIMEOUT_EXIT_CODE, String::new(), true, Outcome::TimedOut),
            };
            InvocationResult {
                argv,
                return_code,
                stdout,
                stderr: String::new(),
                timed_out,
                duration: delay.unwrap_or(Duration::from_millis(1)),
                timeout,
                outcome,
                termination: None,
            }
        })
    }

    fn resolve_tool(&self, name: &str) -> Option<PathBuf> {
        self.installed
            .contains(name)
            .then(|| PathBuf::from(format!("/fake/bin/{name}")))
    }
}
