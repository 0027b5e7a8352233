// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use assetpipe::dag::{RunReport, Scheduler, TaskGraph};
use assetpipe::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use assetpipe::tasks::{DEFAULT, FONTS, LESSIFY_VENDOR, SCRIPTS, STYLES, standard_tasks};
use assetpipe_test_utils::fake_executor::FakeExecutor;
use assetpipe_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn request(target: &str, reason: TriggerReason) -> RuntimeEvent {
    RuntimeEvent::BuildRequested {
        targets: vec![target.to_string()],
        reason,
    }
}

fn position(list: &[String], name: &str) -> usize {
    list.iter()
        .position(|t| t == name)
        .unwrap_or_else(|| panic!("{name} missing from {list:?}"))
}

/// Seed `events`, then run a one-shot runtime over the standard task graph.
async fn run_with(
    events: Vec<RuntimeEvent>,
    failing: Option<&str>,
) -> Result<(Vec<RunReport>, Vec<String>), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let executed = Arc::new(Mutex::new(Vec::new()));

    let mut executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed));
    if let Some(task) = failing {
        executor = executor.failing(task);
    }

    for event in events {
        tx.send(event).await?;
    }

    let graph = TaskGraph::new(standard_tasks())?;
    let core = CoreRuntime::new(
        Scheduler::new(graph),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let reports = with_timeout(Runtime::new(core, rx, executor).run()).await?;
    let executed = executed.lock().unwrap().clone();
    Ok((reports, executed))
}

#[tokio::test]
async fn default_runs_everything_with_styles_after_lessify() -> TestResult {
    init_tracing();

    let (reports, executed) = run_with(vec![request(DEFAULT, TriggerReason::Manual)], None).await?;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.is_success(), "unexpected failures: {:?}", report.failed);
    assert_eq!(report.succeeded.len(), 5);

    assert!(position(&executed, LESSIFY_VENDOR) < position(&executed, STYLES));
    // The aggregate goes last: it waits for all three of its prerequisites.
    assert_eq!(executed.last().map(String::as_str), Some(DEFAULT));
    assert_eq!(position(&report.succeeded, DEFAULT), 4);
    Ok(())
}

#[tokio::test]
async fn single_task_runs_only_its_closure() -> TestResult {
    init_tracing();

    let (reports, executed) = run_with(vec![request(STYLES, TriggerReason::Manual)], None).await?;

    assert_eq!(executed, vec![LESSIFY_VENDOR.to_string(), STYLES.to_string()]);
    assert_eq!(reports[0].succeeded, executed);
    Ok(())
}

#[tokio::test]
async fn failed_lessify_fails_styles_but_not_independent_tasks() -> TestResult {
    init_tracing();

    let (reports, executed) = run_with(
        vec![request(DEFAULT, TriggerReason::Manual)],
        Some(LESSIFY_VENDOR),
    )
    .await?;

    assert!(!executed.iter().any(|t| t == STYLES), "styles must never start");
    assert!(!executed.iter().any(|t| t == DEFAULT));

    let report = &reports[0];
    assert!(!report.is_success());
    let failed = report.failed_tasks();
    for task in [LESSIFY_VENDOR, STYLES, DEFAULT] {
        assert!(failed.iter().any(|t| t == task), "{task} not reported: {failed:?}");
    }

    let mut succeeded = report.succeeded.clone();
    succeeded.sort();
    assert_eq!(succeeded, vec![FONTS.to_string(), SCRIPTS.to_string()]);

    let styles = report.failed.iter().find(|f| f.task == STYLES).unwrap();
    assert!(styles.reason.contains(LESSIFY_VENDOR), "reason: {}", styles.reason);
    Ok(())
}

#[tokio::test]
async fn requests_during_a_run_coalesce_into_one_follow_up() -> TestResult {
    init_tracing();

    // All four requests are queued before the runtime starts, so the three
    // file-watch requests arrive while the first run is active.
    let events = vec![
        request(DEFAULT, TriggerReason::Manual),
        request(DEFAULT, TriggerReason::FileWatch),
        request(DEFAULT, TriggerReason::FileWatch),
        request(DEFAULT, TriggerReason::FileWatch),
    ];
    let (reports, executed) = run_with(events, None).await?;

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(RunReport::is_success));
    assert!(reports[0].run_id < reports[1].run_id);
    assert_eq!(executed.len(), 10);
    Ok(())
}

#[tokio::test]
async fn shutdown_before_any_request_produces_no_runs() -> TestResult {
    init_tracing();

    let (reports, executed) = run_with(vec![RuntimeEvent::ShutdownRequested], None).await?;

    assert!(reports.is_empty());
    assert!(executed.is_empty());
    Ok(())
}
