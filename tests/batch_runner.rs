mod common;
use crate::common::init_tracing;

use std::sync::Arc;

use proptest::prelude::*;
use reconrun::engine::{BatchRunner, Job};
use reconrun::exec::InvocationRequest;
use reconrun::manual::ManualLog;
use reconrun::types::{NOT_FOUND_EXIT_CODE, Outcome};
use reconrun_test_utils::fake_executor::{FakeExecutor, Scripted};

fn job(name: &str, argv: &[&str]) -> Job {
    Job::new(name, InvocationRequest::new(argv.iter().copied()).unwrap())
}

#[tokio::test]
async fn resolves_tools_and_logs_only_failures() {
    init_tracing();
    let fake = Arc::new(
        FakeExecutor::new()
            .with_stdout("subfinder", "a.example.com\nb.example.com\n")
            .with_result("nuclei", Scripted::Timeout)
            .with_exit("httpx", 2),
    );
    let runner = BatchRunner::new(Arc::clone(&fake), ManualLog::new());

    let reports = runner
        .run(vec![
            job("subs", &["subfinder", "-d", "example.com"]),
            job("scan", &["nuclei", "-l", "hosts.txt"]),
            job("probe", &["httpx", "-silent"]),
            job("ports", &["naabu", "-host", "example.com"]),
        ])
        .await;

    assert_eq!(reports[0].result.lines(), vec!["a.example.com", "b.example.com"]);
    assert_eq!(reports[1].result.outcome, Outcome::TimedOut);
    assert_eq!(reports[2].result.return_code, 2);
    assert_eq!(reports[3].result.return_code, NOT_FOUND_EXIT_CODE);

    // naabu is not installed, so it was never dispatched.
    let dispatched = fake.dispatched();
    assert_eq!(dispatched.len(), 3);
    assert_eq!(dispatched[0][0], "/fake/bin/subfinder");

    let records = runner.manual_log().records();
    let reasons: Vec<_> = records.iter().map(|r| r.reason.as_str()).collect();
    assert_eq!(reasons.len(), 3);
    assert!(reasons[0].starts_with("timeout after"));
    assert_eq!(reasons[1], "exit code 2");
    assert_eq!(reasons[2], "tool not found");
    assert_eq!(records[2].command, "naabu -host example.com");
}

#[tokio::test]
async fn explicit_paths_skip_resolution() {
    init_tracing();
    let fake = Arc::new(FakeExecutor::new());
    let runner = BatchRunner::new(Arc::clone(&fake), ManualLog::new());

    let reports = runner.run(vec![job("local", &["./bin/tool", "-x"])]).await;

    assert!(reports[0].result.success());
    assert_eq!(fake.dispatched(), vec![vec!["./bin/tool".to_string(), "-x".to_string()]]);
    assert!(runner.manual_log().is_empty());
}

// Each case: (exit code, timed out?). Tool names encode the index so
// ordering can be checked against the manual log.
fn outcomes() -> impl Strategy<Value = Vec<(i32, bool)>> {
    proptest::collection::vec((0i32..4, any::<bool>()), 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn manual_log_holds_exactly_the_failures_in_order(cases in outcomes()) {
        let mut fake = FakeExecutor::new();
        let mut jobs = Vec::new();
        for (i, (code, timed_out)) in cases.iter().enumerate() {
            let tool = format!("tool{i}");
            fake = if *timed_out {
                fake.with_result(&tool, Scripted::Timeout)
            } else {
                fake.with_exit(&tool, *code)
            };
            jobs.push(job(&format!("job{i}"), &[tool.as_str()]));
        }

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let runner = BatchRunner::new(Arc::new(fake), ManualLog::new());
        let reports = rt.block_on(runner.run(jobs));

        let expected: Vec<String> = reports
            .iter()
            .filter(|r| !r.result.success())
            .map(|r| r.description.clone())
            .collect();
        let logged: Vec<String> = runner
            .manual_log()
            .records()
            .into_iter()
            .map(|r| r.description)
            .collect();

        prop_assert_eq!(logged, expected);
        for (report, (code, timed_out)) in reports.iter().zip(cases.iter()) {
            prop_assert_eq!(report.result.success(), *code == 0 && !*timed_out);
        }
    }
}
