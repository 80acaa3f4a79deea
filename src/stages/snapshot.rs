//! Immutable copies of tracker state for renderers.

use serde::{Deserialize, Serialize};

use crate::stages::status::StageStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: String,
    pub status: StageStatus,
}

/// Ordered stage statuses plus the current stage at the moment of capture.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub stages: Vec<StageEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
}

/// Number of stages in each status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageCounts {
    pub pending: usize,
    pub current: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StageCounts {
    pub fn record(&mut self, status: StageStatus) {
        match status {
            StageStatus::Pending => self.pending += 1,
            StageStatus::Current => self.current += 1,
            StageStatus::Completed => self.completed += 1,
            StageStatus::Skipped => self.skipped += 1,
            StageStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.current + self.completed + self.skipped + self.failed
    }
}

impl StageSnapshot {
    pub fn get(&self, stage: &str) -> Option<StageStatus> {
        self.stages
            .iter()
            .find(|entry| entry.stage == stage)
            .map(|entry| entry.status)
    }

    pub fn counts(&self) -> StageCounts {
        let mut counts = StageCounts::default();
        for entry in &self.stages {
            counts.record(entry.status);
        }
        counts
    }

    pub fn has_failure(&self) -> bool {
        self.stages
            .iter()
            .any(|entry| entry.status == StageStatus::Failed)
    }

    /// No stage is left pending or current.
    pub fn is_finished(&self) -> bool {
        let counts = self.counts();
        counts.pending == 0 && counts.current == 0
    }
}
