//! Stage timing: turns tracker marker events into durations and telemetry events.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::time::Instant;
use tracing::debug;

use crate::stages::{StageEvent, StageObserver, StageStatus};
use crate::telemetry::events::{StageEnteredData, StageExitedData};
use crate::telemetry::sessions::TelemetryRuntime;

/// Time spent in one stage, from becoming current to leaving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: String,
    pub status: StageStatus,
    pub duration: Duration,
}

/// Shared view of the timings recorded by a [`StageTimer`].
#[derive(Debug, Clone, Default)]
pub struct TimingLog(Arc<Mutex<Vec<StageTiming>>>);

impl TimingLog {
    pub fn timings(&self) -> Vec<StageTiming> {
        self.0.lock().clone()
    }

    fn push(&self, timing: StageTiming) {
        self.0.lock().push(timing);
    }
}

/// Observer measuring each stage on a monotonic clock.
pub struct StageTimer {
    open: HashMap<String, Instant>,
    log: TimingLog,
    telemetry: Option<(TelemetryRuntime, String)>,
}

impl Default for StageTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTimer {
    pub fn new() -> Self {
        Self {
            open: HashMap::new(),
            log: TimingLog::default(),
            telemetry: None,
        }
    }

    /// Also emit `stage_entered` / `stage_exited` events into `session_id`.
    pub fn with_telemetry(mut self, runtime: TelemetryRuntime, session_id: impl Into<String>) -> Self {
        self.telemetry = Some((runtime, session_id.into()));
        self
    }

    pub fn log(&self) -> TimingLog {
        self.log.clone()
    }

    fn entered(&mut self, stage: &str) {
        self.open.insert(stage.to_string(), Instant::now());
        debug!(stage = %stage, "stage entered");
        if let Some((runtime, session)) = &self.telemetry {
            let data = StageEnteredData {
                stage: stage.to_string(),
            };
            runtime.emit_event_best_effort(session, "stage_entered", json!(data));
        }
    }

    fn exited(&mut self, stage: &str, status: StageStatus) {
        let duration = self.open.remove(stage).map(|started| started.elapsed());
        if let Some(duration) = duration {
            self.log.push(StageTiming {
                stage: stage.to_string(),
                status,
                duration,
            });
        }
        debug!(
            stage = %stage,
            status = %status,
            duration_ms = ?duration.map(|d| d.as_millis()),
            "stage exited"
        );
        if let Some((runtime, session)) = &self.telemetry {
            let data = StageExitedData {
                stage: stage.to_string(),
                status: status.as_str().to_string(),
                duration_ms: duration.map(|d| d.as_millis()),
            };
            runtime.emit_event_best_effort(session, "stage_exited", json!(data));
        }
    }
}

impl StageObserver for StageTimer {
    fn on_event(&mut self, event: &StageEvent<'_>) {
        match *event {
            StageEvent::Entered { stage } => self.entered(stage),
            StageEvent::Exited { stage, status } => self.exited(stage, status),
        }
    }
}
