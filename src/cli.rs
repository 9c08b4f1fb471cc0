// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{DEFAULT_CONFIG_FILE, parse_duration};

/// Command-line arguments for `reconrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "reconrun",
    version,
    about = "Run recon tool jobs concurrently with timeouts and a manual replay log.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory for `manual_commands.{json,sh}` and `summary.json`.
    #[arg(long, value_name = "DIR", default_value = "reconrun-output")]
    pub output_dir: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RECONRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Override `[engine].max_concurrent`.
    #[arg(long, value_name = "N", value_parser = parse_max_concurrent)]
    pub max_concurrent: Option<usize>,

    /// Override `[engine].default_timeout` (e.g. `90s`, `10m`).
    #[arg(long, value_name = "DURATION", value_parser = parse_cli_duration)]
    pub timeout: Option<Duration>,

    /// Parse + validate, print the jobs, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Report which known tools are installed (with versions) and exit.
    #[arg(long)]
    pub check_tools: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_max_concurrent(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_cli_duration(s: &str) -> Result<Duration, String> {
    match parse_duration(s) {
        Ok(d) if d.is_zero() => Err("duration must be greater than zero".to_string()),
        Ok(d) => Ok(d),
        Err(e) => Err(e.to_string()),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = CliArgs::try_parse_from([
            "reconrun",
            "--config",
            "jobs.toml",
            "--max-concurrent",
            "4",
            "--timeout",
            "90s",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("jobs.toml"));
        assert_eq!(args.max_concurrent, Some(4));
        assert_eq!(args.timeout, Some(Duration::from_secs(90)));
        assert!(!args.dry_run);
    }

    #[test]
    fn config_defaults_to_the_standard_file_name() {
        let args = CliArgs::try_parse_from(["reconrun"]).unwrap();
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(args.output_dir, PathBuf::from("reconrun-output"));
    }

    #[test]
    fn rejects_zero_values() {
        assert!(CliArgs::try_parse_from(["reconrun", "--max-concurrent", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["reconrun", "--timeout", "0s"]).is_err());
    }
}
