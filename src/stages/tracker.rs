//! Ordered stage state machine.

use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::StageError;
use crate::stages::observer::{StageEvent, StageObserver};
use crate::stages::snapshot::{StageCounts, StageEntry, StageSnapshot};
use crate::stages::status::StageStatus;

/// Flags for [`StageTracker::advance`]. `has_error` wins when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceOptions {
    pub has_error: bool,
    pub is_stopping: bool,
}

impl AdvanceOptions {
    pub fn error() -> Self {
        Self {
            has_error: true,
            is_stopping: false,
        }
    }

    pub fn stopping() -> Self {
        Self {
            has_error: false,
            is_stopping: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    None,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct StageState {
    status: StageStatus,
    marker: Marker,
}

/// Tracks which stage of a fixed pipeline is active and classifies the others.
pub struct StageTracker {
    stages: IndexMap<String, StageState>,
    current: Option<String>,
    observer: Option<Box<dyn StageObserver>>,
}

impl fmt::Debug for StageTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageTracker")
            .field("stages", &self.stages)
            .field("current", &self.current)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl StageTracker {
    /// Create a tracker with every stage `pending` and no current stage.
    pub fn new<I, S>(stages: I) -> Result<Self, StageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = IndexMap::new();
        for stage in stages {
            let stage = stage.into();
            if map.contains_key(&stage) {
                return Err(StageError::DuplicateStage(stage));
            }
            map.insert(
                stage,
                StageState {
                    status: StageStatus::Pending,
                    marker: Marker::None,
                },
            );
        }
        if map.is_empty() {
            return Err(StageError::EmptyPipeline);
        }
        Ok(Self {
            stages: map,
            current: None,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: impl StageObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn set_observer(&mut self, observer: impl StageObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Move the pipeline to `next` and recompute every stage's status.
    ///
    /// Rules, first match wins per stage:
    /// skipped/failed stages are untouched; `next` becomes failed, completed or
    /// current depending on `options`; earlier pending stages become skipped; other
    /// earlier stages become completed; later stages become pending.
    pub fn advance(&mut self, next: &str, options: AdvanceOptions) -> Result<(), StageError> {
        let next_index = self
            .stages
            .get_index_of(next)
            .ok_or_else(|| StageError::UnknownStage(next.to_string()))?;

        for index in 0..self.stages.len() {
            let status = self.stages[index].status;
            if status.is_terminal() {
                continue;
            }
            let new_status = if index == next_index {
                if options.has_error {
                    StageStatus::Failed
                } else if options.is_stopping {
                    StageStatus::Completed
                } else {
                    StageStatus::Current
                }
            } else if index < next_index {
                if status == StageStatus::Pending {
                    StageStatus::Skipped
                } else {
                    StageStatus::Completed
                }
            } else {
                StageStatus::Pending
            };
            self.apply(index, new_status);
        }

        trace!(stage = %next, ?options, "advanced stage pipeline");
        Ok(())
    }

    /// Force `stage` into `status`, bypassing the terminal-status rule.
    ///
    /// Setting a stage `current` demotes the previous current stage: to completed
    /// when it comes earlier in the pipeline, to pending when it comes later.
    pub fn set(&mut self, stage: &str, status: StageStatus) -> Result<(), StageError> {
        let index = self
            .stages
            .get_index_of(stage)
            .ok_or_else(|| StageError::UnknownStage(stage.to_string()))?;

        if status == StageStatus::Current {
            if let Some(previous) = self.current_index().filter(|&prev| prev != index) {
                let demoted = if previous < index {
                    StageStatus::Completed
                } else {
                    StageStatus::Pending
                };
                self.apply(previous, demoted);
            }
        }
        self.apply(index, status);
        Ok(())
    }

    pub fn get(&self, stage: &str) -> Option<StageStatus> {
        self.stages.get(stage).map(|state| state.status)
    }

    /// Stage names with their statuses, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, StageStatus)> + '_ {
        self.stages
            .iter()
            .map(|(stage, state)| (stage.as_str(), state.status))
    }

    pub fn stages(&self) -> impl Iterator<Item = &str> + '_ {
        self.stages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn position(&self, stage: &str) -> Option<usize> {
        self.stages.get_index_of(stage)
    }

    pub fn current_stage(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn counts(&self) -> StageCounts {
        let mut counts = StageCounts::default();
        for state in self.stages.values() {
            counts.record(state.status);
        }
        counts
    }

    pub fn is_finished(&self) -> bool {
        let counts = self.counts();
        counts.pending == 0 && counts.current == 0
    }

    pub fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            stages: self
                .stages
                .iter()
                .map(|(stage, state)| StageEntry {
                    stage: stage.clone(),
                    status: state.status,
                })
                .collect(),
            current: self.current.clone(),
        }
    }

    fn current_index(&self) -> Option<usize> {
        self.current
            .as_deref()
            .and_then(|stage| self.stages.get_index_of(stage))
    }

    /// Set a status, keep the current pointer in sync and open/close the marker.
    fn apply(&mut self, index: usize, status: StageStatus) {
        let Some((stage, state)) = self.stages.get_index_mut(index) else {
            return;
        };
        state.status = status;

        let event = if status == StageStatus::Current {
            self.current = Some(stage.clone());
            if state.marker == Marker::Open {
                None
            } else {
                state.marker = Marker::Open;
                Some(StageEvent::Entered { stage })
            }
        } else {
            if self.current.as_deref() == Some(stage.as_str()) {
                self.current = None;
            }
            if state.marker == Marker::Open {
                state.marker = Marker::Closed;
                Some(StageEvent::Exited { stage, status })
            } else {
                None
            }
        };

        if let (Some(event), Some(observer)) = (event, self.observer.as_mut()) {
            observer.on_event(&event);
        }
    }
}
