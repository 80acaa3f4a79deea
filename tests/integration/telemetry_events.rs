//! Telemetry sessions and stage events written to JSONL.

use orgtrack::stages::{AdvanceOptions, StageTracker};
use orgtrack::telemetry::sinks::read_jsonl;
use orgtrack::telemetry::{JsonlSink, StageTimer, TelemetryRuntime};
use tempfile::TempDir;

#[test]
fn test_session_events_are_sequenced_per_session() {
    let (runtime, sink) = TelemetryRuntime::in_memory();
    let first = runtime.start_session("replay").unwrap();
    let second = runtime.start_session("sandbox").unwrap();
    assert_ne!(first, second);

    runtime.finish_session(&first, true, None).unwrap();
    runtime
        .finish_session(&second, false, Some("boom".to_string()))
        .unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 4);
    for event in &events {
        let expected = if event.event_type == "session_started" { 1 } else { 2 };
        assert_eq!(event.seq, expected, "event {:?}", event);
    }
    let ended = sink.events_of_type("session_ended");
    assert_eq!(ended[0].data["status"], "completed");
    assert_eq!(ended[1].data["status"], "failed");
    assert_eq!(ended[1].data["error"], "boom");
}

#[test]
fn test_stage_events_land_in_jsonl_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("events.jsonl");
    let runtime = TelemetryRuntime::new(Box::new(JsonlSink::open(&path).unwrap()));
    let session = runtime.start_session("replay").unwrap();

    let timer = StageTimer::new().with_telemetry(runtime.clone(), session.clone());
    let mut tracker = StageTracker::new(["Creating", "Refreshing", "Authenticating"])
        .unwrap()
        .with_observer(timer);
    tracker.advance("Creating", AdvanceOptions::default()).unwrap();
    tracker.advance("Authenticating", AdvanceOptions::default()).unwrap();
    tracker
        .advance("Authenticating", AdvanceOptions::stopping())
        .unwrap();
    runtime.finish_session(&session, true, None).unwrap();

    let events = read_jsonl(&path).unwrap();
    let kinds: Vec<(&str, Option<&str>)> = events
        .iter()
        .map(|e| (e.event_type.as_str(), e.data["stage"].as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("session_started", None),
            ("stage_entered", Some("Creating")),
            ("stage_exited", Some("Creating")),
            ("stage_entered", Some("Authenticating")),
            ("stage_exited", Some("Authenticating")),
            ("session_ended", None),
        ]
    );
    let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);
    assert!(events.iter().all(|e| e.session == session));
    assert!(chrono::DateTime::parse_from_rfc3339(&events[0].ts).is_ok());
}
