// src/manual/mod.rs

//! Manual fallback log.
//!
//! Invocations that did not succeed are recorded here so an operator can
//! replay them later. On flush the log is persisted twice:
//!
//! - `manual_commands.json`: the records as a pretty-printed array.
//! - `manual_commands.sh`: an executable bash script with one commented
//!   block per record.
//!
//! Records are append-only and kept in recording order.

pub mod quote;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::InvocationResult;

pub use quote::{shell_join, shell_quote};

pub const MANUAL_JSON_FILE: &str = "manual_commands.json";
pub const MANUAL_SCRIPT_FILE: &str = "manual_commands.sh";

/// One command the operator may want to re-run by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCommand {
    pub description: String,
    /// Shell-quoted command line.
    pub command: String,
    pub reason: String,
}

/// Where [`ManualLog::flush`] wrote its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushedLog {
    pub json_path: PathBuf,
    pub script_path: PathBuf,
    pub records: usize,
}

/// Shared, append-only list of [`ManualCommand`]s.
#[derive(Debug, Clone, Default)]
pub struct ManualLog {
    records: Arc<Mutex<Vec<ManualCommand>>>,
}

impl ManualLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ManualCommand>> {
        // A panic while pushing can't leave the Vec half-written.
        self.records.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn record<S: AsRef<str>>(
        &self,
        description: impl Into<String>,
        argv: &[S],
        reason: impl Into<String>,
    ) {
        let entry = ManualCommand {
            description: description.into(),
            command: shell_join(argv),
            reason: reason.into(),
        };
        debug!(description = %entry.description, reason = %entry.reason, "manual command logged");
        self.lock().push(entry);
    }

    /// Record `result` if it did not succeed. Returns whether a record was
    /// added.
    pub fn record_failure(&self, description: impl Into<String>, result: &InvocationResult) -> bool {
        match result.failure_reason() {
            Some(reason) => {
                self.record(description, &result.argv, reason);
                true
            }
            None => false,
        }
    }

    pub fn records(&self) -> Vec<ManualCommand> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write both files into `output_dir`, creating it if needed.
    ///
    /// Both files are written even when there are no records.
    pub fn flush(&self, output_dir: &Path) -> Result<FlushedLog> {
        let records = self.records();
        fs::create_dir_all(output_dir)?;

        let json_path = output_dir.join(MANUAL_JSON_FILE);
        fs::write(&json_path, serde_json::to_string_pretty(&records)?)?;

        let script_path = output_dir.join(MANUAL_SCRIPT_FILE);
        fs::write(&script_path, render_script(&records))?;
        make_executable(&script_path)?;

        info!(
            records = records.len(),
            script = %script_path.display(),
            "manual commands saved"
        );
        Ok(FlushedLog {
            json_path,
            script_path,
            records: records.len(),
        })
    }
}

/// Render the replay script.
pub fn render_script(records: &[ManualCommand]) -> String {
    let mut out = String::from(
        "#!/bin/bash\n\
         # Manual commands that timed out or failed\n\
         # Review and execute manually as needed\n\n",
    );
    for rec in records {
        out.push_str(&format!("# {}\n", single_line(&rec.description)));
        out.push_str(&format!("# Reason: {}\n", single_line(&rec.reason)));
        out.push_str(&rec.command);
        out.push_str("\n\n");
    }
    out
}

// Keep comment text from spilling into a command line.
fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::types::Outcome;

    fn result(code: i32) -> InvocationResult {
        InvocationResult {
            argv: vec!["subfinder".into(), "-d".into(), "example.com".into()],
            return_code: code,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
            duration: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(30)),
            outcome: Outcome::Completed,
            termination: None,
        }
    }

    #[test]
    fn successes_are_not_recorded() {
        let log = ManualLog::new();
        assert!(!log.record_failure("ok", &result(0)));
        assert!(log.record_failure("bad", &result(2)));
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "exit code 2");
        assert_eq!(records[0].command, "subfinder -d example.com");
    }

    #[test]
    fn script_has_header_and_one_block_per_record() {
        let records = vec![ManualCommand {
            description: "Port scan\nsecond line".into(),
            command: "nmap -p- host".into(),
            reason: "timeout after 600s".into(),
        }];
        let script = render_script(&records);
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("# Port scan second line\n# Reason: timeout after 600s\nnmap -p- host\n\n"));
    }

    #[test]
    fn flush_writes_both_files_even_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let flushed = ManualLog::new().flush(&out).unwrap();

        assert_eq!(flushed.records, 0);
        let json = fs::read_to_string(&flushed.json_path).unwrap();
        assert_eq!(serde_json::from_str::<Vec<ManualCommand>>(&json).unwrap(), vec![]);
        let script = fs::read_to_string(&flushed.script_path).unwrap();
        assert!(script.starts_with("#!/bin/bash"));
    }

    #[cfg(unix)]
    #[test]
    fn flushed_script_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = ManualLog::new();
        log.record("x", &["false"], "exit code 1");
        let flushed = log.flush(dir.path()).unwrap();
        let mode = fs::metadata(&flushed.script_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
