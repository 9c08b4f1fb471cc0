// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod manual;
pub mod summary;
pub mod tools;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::engine::{BatchRunner, Engine, EngineConfig, Job, JobReport};
use crate::exec::BinaryResolver;
use crate::manual::{FlushedLog, ManualLog};
use crate::summary::{RunSummary, write_summary};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - the engine and the batch runner
/// - Ctrl-C handling (cancels everything in flight)
/// - the manual-command log and `summary.json`
pub async fn run(args: CliArgs) -> Result<()> {
    if args.check_tools {
        return check_tools_report(&args).await;
    }

    let cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let engine_config = apply_overrides(cfg.engine, &args);

    if args.dry_run {
        print_dry_run(&engine_config, &cfg.jobs);
        return Ok(());
    }

    let engine = Arc::new(Engine::new(engine_config));

    // Ctrl-C → cancel in-flight invocations; the batch then finishes with
    // cancelled results and everything is still flushed.
    let ctrl_c = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; stopping running tools");
            engine.shutdown().await;
        })
    };

    let runner = BatchRunner::new(Arc::clone(&engine), ManualLog::new());
    let reports = runner.run(cfg.jobs).await;

    ctrl_c.abort();
    engine.shutdown().await;

    let flushed = runner
        .manual_log()
        .flush(&args.output_dir)
        .context("writing manual command log")?;
    let summary = RunSummary::new(engine.summary(), &reports, flushed.records);
    let summary_path =
        write_summary(&args.output_dir, &summary).context("writing summary.json")?;

    print_report(&reports, &flushed);
    println!("summary: {}", summary_path.display());
    Ok(())
}

/// CLI flags win over `[engine]` values.
fn apply_overrides(mut config: EngineConfig, args: &CliArgs) -> EngineConfig {
    if let Some(n) = args.max_concurrent {
        config.max_concurrent = n;
    }
    if let Some(timeout) = args.timeout {
        config.default_timeout = timeout;
    }
    config
}

async fn check_tools_report(args: &CliArgs) -> Result<()> {
    let mut engine_config = EngineConfig::default();
    // Reuse configured search paths when a config is present.
    if args.config.is_file() {
        let cfg = load_and_validate(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?;
        engine_config = cfg.engine;
    }
    let engine = Engine::new(apply_overrides(engine_config, args));

    let groups = tools::ToolCategory::ALL
        .iter()
        .map(|&category| (category.label(), tools::tools_in(category)))
        .chain(std::iter::once(("Other", tools::uncategorised())));

    let mut missing = Vec::new();
    for (label, names) in groups {
        println!("{label}:");
        for info in tools::check_tools(&engine, &names[..]).await {
            if !info.available {
                println!("  [-] {}", info.name);
                missing.push(info);
                continue;
            }
            match &info.version {
                Some(v) => println!("  [+] {} v{v}", info.name),
                None => println!("  [+] {}", info.name),
            }
        }
    }

    if !missing.is_empty() {
        println!();
        println!("Missing ({}):", missing.len());
        for info in &missing {
            let hint = info.install_hint.as_deref().and_then(|h| h.lines().next());
            match hint {
                Some(hint) => println!("  {}: {hint}", info.name),
                None => println!("  {}", info.name),
            }
        }
    }
    Ok(())
}

fn print_dry_run(config: &EngineConfig, jobs: &[Job]) {
    println!("reconrun dry-run");
    println!("  engine.max_concurrent = {}", config.max_concurrent);
    println!("  engine.default_timeout = {:?}", config.default_timeout);
    println!("  engine.grace_period = {:?}", config.grace_period);
    if !config.search_paths.is_empty() {
        println!("  engine.search_paths = {:?}", config.search_paths);
    }
    println!();

    let resolver = BinaryResolver::new(config.search_paths.clone());
    let programs: Vec<&str> = jobs.iter().map(|job| job.request.program()).collect();
    let missing = tools::missing_tools(&resolver, &programs);

    println!("jobs ({}):", jobs.len());
    for job in jobs {
        let req = &job.request;
        println!("  - {}", job.name);
        println!("      cmd: {}", manual::shell_join(req.argv()));
        if missing.iter().any(|m| m == req.program()) {
            println!("      (not installed)");
        }
        if req.description() != req.argv().join(" ") {
            println!("      description: {}", req.description());
        }
        if let Some(timeout) = req.timeout() {
            println!("      timeout: {timeout:?}");
        }
        if let Some(cwd) = req.cwd() {
            println!("      cwd: {}", cwd.display());
        }
        if !req.env().is_empty() {
            println!("      env: {:?}", req.env());
        }
    }

    debug!("dry-run complete (no execution)");
}

fn print_report(reports: &[JobReport], flushed: &FlushedLog) {
    println!("{:<20} {:<14} {:>6} {:>9}", "JOB", "OUTCOME", "CODE", "TIME");
    for report in reports {
        let r = &report.result;
        let outcome = if r.success() {
            "ok".to_string()
        } else {
            r.outcome.to_string()
        };
        println!(
            "{:<20} {:<14} {:>6} {:>8.1}s",
            report.name,
            outcome,
            r.return_code,
            r.duration.as_secs_f64()
        );
    }
    println!();
    if flushed.records > 0 {
        println!(
            "{} command(s) need manual attention: {}",
            flushed.records,
            flushed.script_path.display()
        );
    } else {
        println!("all jobs succeeded");
    }
}
