//! Stage transition rules driven through the public tracker API.

use orgtrack::stages::{AdvanceOptions, StageEvent, StageStatus, StageTracker};
use orgtrack::error::StageError;
use std::sync::{Arc, Mutex};

use StageStatus::{Completed, Current, Failed, Pending, Skipped};

fn statuses(tracker: &StageTracker) -> Vec<StageStatus> {
    tracker.entries().map(|(_, status)| status).collect()
}

fn abc() -> StageTracker {
    StageTracker::new(["A", "B", "C"]).unwrap()
}

#[test]
fn test_fresh_tracker_is_all_pending() {
    let tracker = abc();
    assert_eq!(statuses(&tracker), vec![Pending, Pending, Pending]);
    assert_eq!(tracker.current_stage(), None);
    assert!(!tracker.is_finished());
}

#[test]
fn test_walking_the_pipeline_completes_earlier_stages() {
    let mut tracker = abc();
    tracker.advance("A", AdvanceOptions::default()).unwrap();
    tracker.advance("B", AdvanceOptions::default()).unwrap();
    assert_eq!(statuses(&tracker), vec![Completed, Current, Pending]);

    tracker.advance("C", AdvanceOptions::default()).unwrap();
    assert_eq!(statuses(&tracker), vec![Completed, Completed, Current]);
    assert_eq!(tracker.current_stage(), Some("C"));
}

#[test]
fn test_jumping_ahead_skips_unvisited_stages() {
    let mut tracker = abc();
    tracker.advance("B", AdvanceOptions::default()).unwrap();
    assert_eq!(statuses(&tracker), vec![Skipped, Current, Pending]);

    tracker.advance("C", AdvanceOptions::default()).unwrap();
    assert_eq!(statuses(&tracker), vec![Skipped, Completed, Current]);
}

#[test]
fn test_error_from_initial_state() {
    let mut tracker = abc();
    tracker.advance("B", AdvanceOptions::error()).unwrap();
    assert_eq!(statuses(&tracker), vec![Skipped, Failed, Pending]);
    assert_eq!(tracker.current_stage(), None);
}

#[test]
fn test_terminal_stages_survive_later_advances() {
    let mut tracker = abc();
    tracker.advance("B", AdvanceOptions::error()).unwrap();
    tracker.advance("C", AdvanceOptions::default()).unwrap();
    tracker.advance("A", AdvanceOptions::default()).unwrap();
    tracker.advance("C", AdvanceOptions::stopping()).unwrap();
    assert_eq!(tracker.get("A"), Some(Skipped));
    assert_eq!(tracker.get("B"), Some(Failed));
}

#[test]
fn test_stopping_the_current_stage_changes_nothing_else() {
    let mut tracker = abc();
    tracker.advance("A", AdvanceOptions::default()).unwrap();
    tracker.advance("A", AdvanceOptions::stopping()).unwrap();
    assert_eq!(statuses(&tracker), vec![Completed, Pending, Pending]);
    assert_eq!(tracker.current_stage(), None);
}

#[test]
fn test_repeated_advance_is_idempotent() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut tracker = abc().with_observer(move |event: &StageEvent<'_>| {
        sink.lock().unwrap().push(event.stage().to_string());
    });

    tracker.advance("B", AdvanceOptions::default()).unwrap();
    let before = tracker.snapshot();
    tracker.advance("B", AdvanceOptions::default()).unwrap();
    assert_eq!(tracker.snapshot(), before);
    assert_eq!(*events.lock().unwrap(), vec!["B".to_string()]);
}

#[test]
fn test_unknown_stage_is_rejected_without_changes() {
    let mut tracker = abc();
    tracker.advance("A", AdvanceOptions::default()).unwrap();
    let before = tracker.snapshot();
    let err = tracker.advance("Z", AdvanceOptions::default()).unwrap_err();
    assert_eq!(err, StageError::UnknownStage("Z".to_string()));
    assert_eq!(tracker.snapshot(), before);
}

#[test]
fn test_set_overrides_terminal_status() {
    let mut tracker = abc();
    tracker.advance("B", AdvanceOptions::error()).unwrap();
    tracker.set("B", Current).unwrap();
    assert_eq!(tracker.get("B"), Some(Current));
    assert_eq!(tracker.current_stage(), Some("B"));

    tracker.set("C", Skipped).unwrap();
    tracker.advance("C", AdvanceOptions::default()).unwrap();
    assert_eq!(tracker.get("C"), Some(Skipped));
}

#[test]
fn test_construction_rejects_bad_pipelines() {
    assert_eq!(
        StageTracker::new(Vec::<String>::new()).unwrap_err(),
        StageError::EmptyPipeline
    );
    assert_eq!(
        StageTracker::new(["A", "B", "A"]).unwrap_err(),
        StageError::DuplicateStage("A".to_string())
    );
}
