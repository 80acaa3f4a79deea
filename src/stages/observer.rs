//! Timing-marker side channel for stage transitions.

use crate::stages::status::StageStatus;

/// Emitted when a stage's timing marker opens or closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent<'a> {
    /// The stage became current and its marker opened.
    Entered { stage: &'a str },
    /// An open marker closed; `status` is the stage's new status.
    Exited { stage: &'a str, status: StageStatus },
}

impl StageEvent<'_> {
    pub fn stage(&self) -> &str {
        match self {
            StageEvent::Entered { stage } | StageEvent::Exited { stage, .. } => stage,
        }
    }
}

/// Receives marker open/close notifications from a tracker.
pub trait StageObserver: Send {
    fn on_event(&mut self, event: &StageEvent<'_>);
}

impl<F> StageObserver for F
where
    F: FnMut(&StageEvent<'_>) + Send,
{
    fn on_event(&mut self, event: &StageEvent<'_>) {
        self(event)
    }
}
