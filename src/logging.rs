// src/logging.rs

//! Logging setup for `reconrun` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level`, applied to every target
//! 2. `RECONRUN_LOG`, in `EnvFilter` directive syntax
//!    (e.g. `debug` or `reconrun::exec=trace,info`)
//! 3. `info`
//!
//! Logs go to stderr so stdout stays free for the job report.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "RECONRUN_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let directives = filter_directives(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref());
    let filter = EnvFilter::try_new(&directives)?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    tracing::debug!(%directives, "logging initialised");
    Ok(())
}

/// Pick the filter directives. An unparsable `RECONRUN_LOG` falls back to
/// the default instead of aborting the run.
fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return level_directive(level).to_string();
    }
    match env.map(str::trim) {
        Some(raw) if !raw.is_empty() && EnvFilter::try_new(raw).is_ok() => raw.to_string(),
        _ => DEFAULT_DIRECTIVE.to_string(),
    }
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
