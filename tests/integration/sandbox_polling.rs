//! Sandbox tracking against recorded feeds, with paused tokio time.

use orgtrack::error::ApiError;
use orgtrack::poll::PollOptions;
use orgtrack::sandbox::{
    finish_authentication, sandbox_stage_tracker, track_sandbox, FeedSandboxSource,
    SandboxProgress, SandboxStatus,
};
use orgtrack::stages::{SharedStageTracker, StageStatus};
use orgtrack::telemetry::{StageTimer, TelemetryRuntime};
use std::time::Duration;

fn report(status: SandboxStatus, copy_progress: u8) -> SandboxProgress {
    SandboxProgress {
        sandbox_name: "uat".to_string(),
        id: None,
        status,
        copy_progress,
        error: None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_feed_timings_follow_poll_interval() {
    let source = FeedSandboxSource::new(vec![
        report(SandboxStatus::Pending, 0),
        report(SandboxStatus::Pending, 0),
        report(SandboxStatus::Processing, 50),
        report(SandboxStatus::Completed, 100),
    ])
    .unwrap();
    let timer = StageTimer::new();
    let log = timer.log();
    let tracker = SharedStageTracker::new(sandbox_stage_tracker().unwrap().with_observer(timer));
    let options = PollOptions::new(Duration::from_secs(30), Duration::from_secs(3600));

    let mut updates = 0;
    track_sandbox(&source, &tracker, options, |_, _| updates += 1)
        .await
        .unwrap();
    finish_authentication(&tracker, true).unwrap();

    assert_eq!(updates, 4);
    let snapshot = tracker.snapshot();
    assert!(snapshot.is_finished());
    assert_eq!(snapshot.get("Activating"), Some(StageStatus::Skipped));

    let timings = log.timings();
    let stages: Vec<&str> = timings.iter().map(|t| t.stage.as_str()).collect();
    assert_eq!(stages, vec!["Pending", "Processing", "Authenticating"]);
    assert!(timings[0].duration >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_failed_authentication_fails_last_stage() {
    let source = FeedSandboxSource::new(vec![report(SandboxStatus::Completed, 100)]).unwrap();
    let tracker = SharedStageTracker::new(sandbox_stage_tracker().unwrap());
    let options = PollOptions::new(Duration::from_secs(1), Duration::from_secs(10));

    track_sandbox(&source, &tracker, options, |_, _| {})
        .await
        .unwrap();
    finish_authentication(&tracker, false).unwrap();

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.get("Authenticating"), Some(StageStatus::Failed));
    assert!(snapshot.has_failure());
    assert_eq!(snapshot.current, None);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_reports_elapsed_and_emits_failure() {
    let (runtime, sink) = TelemetryRuntime::in_memory();
    let session = runtime.start_session("sandbox").unwrap();
    let timer = StageTimer::new().with_telemetry(runtime.clone(), session.clone());
    let tracker = SharedStageTracker::new(sandbox_stage_tracker().unwrap().with_observer(timer));
    let source = FeedSandboxSource::new(vec![report(SandboxStatus::Activating, 100)]).unwrap();
    let options = PollOptions::new(Duration::from_secs(10), Duration::from_secs(25));

    let err = track_sandbox(&source, &tracker, options, |_, _| {})
        .await
        .unwrap_err();
    match err {
        ApiError::PollTimeout { elapsed, .. } => assert!(elapsed >= Duration::from_secs(25)),
        other => panic!("expected timeout, got {:?}", other),
    }

    let exited = sink.events_of_type("stage_exited");
    assert_eq!(exited.len(), 1);
    assert_eq!(exited[0].data["stage"], "Activating");
    assert_eq!(exited[0].data["status"], "failed");
}

#[test]
fn test_feed_loads_vendor_json() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("feed.json");
    std::fs::write(
        &path,
        r#"[{"SandboxName": "uat", "Status": "Processing", "CopyProgress": 10}]"#,
    )
    .unwrap();
    assert!(FeedSandboxSource::from_path(&path).is_ok());

    std::fs::write(&path, "[]").unwrap();
    assert!(matches!(
        FeedSandboxSource::from_path(&path),
        Err(ApiError::SourceError(_))
    ));
}
