//! Tracker handle shared between a driver and a concurrently refreshing renderer.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::StageError;
use crate::stages::snapshot::StageSnapshot;
use crate::stages::status::StageStatus;
use crate::stages::tracker::{AdvanceOptions, StageTracker};

/// Cloneable handle: mutations go through the tracker lock and publish a fresh
/// snapshot, readers only ever see whole snapshots.
#[derive(Debug, Clone)]
pub struct SharedStageTracker {
    tracker: Arc<Mutex<StageTracker>>,
    published: Arc<RwLock<Arc<StageSnapshot>>>,
}

impl SharedStageTracker {
    pub fn new(tracker: StageTracker) -> Self {
        let snapshot = Arc::new(tracker.snapshot());
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            published: Arc::new(RwLock::new(snapshot)),
        }
    }

    pub fn advance(&self, next: &str, options: AdvanceOptions) -> Result<(), StageError> {
        let mut tracker = self.tracker.lock();
        tracker.advance(next, options)?;
        self.publish(&tracker);
        Ok(())
    }

    pub fn set(&self, stage: &str, status: StageStatus) -> Result<(), StageError> {
        let mut tracker = self.tracker.lock();
        tracker.set(stage, status)?;
        self.publish(&tracker);
        Ok(())
    }

    /// Fail whichever stage is current, if any.
    pub fn fail_current(&self) -> Option<String> {
        let mut tracker = self.tracker.lock();
        let current = tracker.current_stage()?.to_string();
        tracker.advance(&current, AdvanceOptions::error()).ok()?;
        self.publish(&tracker);
        Some(current)
    }

    pub fn current_stage(&self) -> Option<String> {
        self.snapshot().current.clone()
    }

    /// Latest published snapshot; never observes a half-applied transition.
    pub fn snapshot(&self) -> Arc<StageSnapshot> {
        self.published.read().clone()
    }

    fn publish(&self, tracker: &StageTracker) {
        *self.published.write() = Arc::new(tracker.snapshot());
    }
}
