// tests/config_loading.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, JobConfigBuilder};

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;
use reconrun::config::{ConfigFile, load_and_validate};
use reconrun::errors::ReconrunError;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_loads_engine_and_jobs() {
    let file = config_file(
        r#"
[engine]
default_timeout = "90s"
max_concurrent = 4
grace_period = "3s"
search_paths = ["/opt/recon/bin"]

[engine.env]
NO_COLOR = "1"

[[job]]
name = "subfinder"
cmd = ["subfinder", "-d", "example.com", "-silent"]
timeout = "10m"
description = "Passive subdomain discovery"

[[job]]
name = "probe"
cmd = ["httpx", "-l", "subs.txt"]
cwd = "out"
env = { HTTPX_THREADS = "50" }
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.engine.default_timeout, Duration::from_secs(90));
    assert_eq!(cfg.engine.max_concurrent, 4);
    assert_eq!(cfg.engine.grace_period, Duration::from_secs(3));
    assert_eq!(cfg.engine.search_paths, vec![PathBuf::from("/opt/recon/bin")]);
    assert_eq!(cfg.engine.env.get("NO_COLOR").map(String::as_str), Some("1"));

    assert_eq!(cfg.jobs.len(), 2);
    let subfinder = &cfg.jobs[0].request;
    assert_eq!(subfinder.timeout(), Some(Duration::from_secs(600)));
    assert_eq!(subfinder.description(), "Passive subdomain discovery");

    let probe = &cfg.jobs[1].request;
    assert_eq!(probe.timeout(), None);
    assert_eq!(probe.description(), "httpx -l subs.txt");
    assert_eq!(probe.cwd(), Some(std::path::Path::new("out")));
    assert_eq!(probe.env().get("HTTPX_THREADS").map(String::as_str), Some("50"));
}

#[test]
fn missing_jobs_is_a_config_error() {
    let file = config_file("[engine]\nmax_concurrent = 2\n");
    match load_and_validate(file.path()) {
        Err(ReconrunError::ConfigError(msg)) => assert!(msg.contains("at least one")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn duplicate_job_names_are_rejected() {
    let file = config_file(
        r#"
[[job]]
name = "a"
cmd = ["true"]

[[job]]
name = "a"
cmd = ["false"]
"#,
    );
    match load_and_validate(file.path()) {
        Err(ReconrunError::ConfigError(msg)) => assert!(msg.contains("duplicate job name 'a'")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn bad_duration_names_the_job() {
    let file = config_file(
        r#"
[[job]]
name = "scan"
cmd = ["nmap"]
timeout = "ten minutes"
"#,
    );
    match load_and_validate(file.path()) {
        Err(ReconrunError::ConfigError(msg)) => assert!(msg.contains("job 'scan' timeout")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn zero_concurrency_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .max_concurrent(0)
        .with_job(JobConfigBuilder::new("a", &["true"]).build())
        .raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(ReconrunError::ConfigError(_))
    ));
}

#[test]
fn unknown_keys_are_toml_errors() {
    let file = config_file(
        r#"
[[job]]
name = "a"
cmd = ["true"]
retries = 3
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ReconrunError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_reported() {
    let err = load_and_validate("/definitely/not/Reconrun.toml").unwrap_err();
    assert!(format!("{err:#}").contains("reading config file"));
}

#[test]
fn builder_produces_a_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .default_timeout("30s")
        .grace_period("1s")
        .engine_env("NO_COLOR", "1")
        .with_job(
            JobConfigBuilder::new("echo", &["echo", "hi"])
                .timeout("5s")
                .description("say hi")
                .env("K", "v")
                .build(),
        )
        .build();
    assert_eq!(cfg.engine.default_timeout, Duration::from_secs(30));
    assert_eq!(cfg.jobs[0].request.description(), "say hi");
}
