// tests/watch_debounce.rs

use std::error::Error;
use std::fs;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use assetpipe::engine::{RuntimeEvent, TriggerReason};
use assetpipe::watch::{WatchSubscription, spawn_watcher};
use assetpipe_test_utils::builders::ConfigFileBuilder;
use assetpipe_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn subscription() -> WatchSubscription {
    let cfg = ConfigFileBuilder::new()
        .with_scripts(&["js/*.js"])
        .with_stylesheets(&["less/*.less"])
        .build();
    WatchSubscription::from_config(&cfg).unwrap()
}

/// Collect every event that arrives within `window`.
async fn drain(rx: &mut mpsc::Receiver<RuntimeEvent>, window: Duration) -> Vec<RuntimeEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = timeout(window, rx.recv()).await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn burst_of_changes_becomes_few_default_requests() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("js"))?;
    fs::create_dir_all(dir.path().join("less"))?;

    let (tx, mut rx) = mpsc::channel(64);
    let handle = spawn_watcher(dir.path(), subscription(), Duration::from_millis(100), tx)?;
    assert_eq!(handle.dirs().len(), 2);

    for name in ["a.js", "b.js", "c.js"] {
        fs::write(dir.path().join("js").join(name), "x();\n")?;
    }
    fs::write(dir.path().join("less").join("main.less"), "body {}\n")?;

    let first = timeout(Duration::from_secs(5), rx.recv())
        .await?
        .expect("watcher channel closed");
    let mut events = vec![first];
    events.extend(drain(&mut rx, Duration::from_millis(500)).await);

    // One debounced batch, possibly split across a tick boundary.
    assert!(
        (1..=2).contains(&events.len()),
        "expected 1-2 requests, got {events:?}"
    );
    for event in &events {
        match event {
            RuntimeEvent::BuildRequested { targets, reason } => {
                assert_eq!(targets, &vec!["default".to_string()]);
                assert_eq!(*reason, TriggerReason::FileWatch);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    Ok(())
}

#[tokio::test]
async fn unwatched_files_do_not_trigger() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("js"))?;

    let (tx, mut rx) = mpsc::channel(64);
    let _handle = spawn_watcher(dir.path(), subscription(), Duration::from_millis(50), tx)?;

    fs::write(dir.path().join("js").join("notes.txt"), "not a script")?;
    fs::create_dir_all(dir.path().join("js").join("nested"))?;
    fs::write(dir.path().join("js").join("nested").join("deep.js"), "x();")?;

    let events = drain(&mut rx, Duration::from_millis(600)).await;
    assert!(events.is_empty(), "unexpected requests: {events:?}");
    Ok(())
}
