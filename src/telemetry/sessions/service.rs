//! Session lifecycle service. No CLI dependency; takes command_name as String.

use std::sync::mpsc::SendError;

use serde_json::json;
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::telemetry::events::{ProgressEnvelope, SessionEndedData, SessionStartedData};
use crate::telemetry::routing::bus::ProgressBus;
use crate::telemetry::routing::ingestor::{EventIngestor, SharedIngestor};
use crate::telemetry::sessions::policy::SessionStatus;
use crate::telemetry::sinks::{EventSink, MemorySink};
use crate::telemetry::types::new_session_id;

/// Runtime for session lifecycle and event emission. Holds bus and ingestor.
#[derive(Clone)]
pub struct TelemetryRuntime {
    bus: ProgressBus,
    ingestor: SharedIngestor,
}

impl TelemetryRuntime {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        let (bus, rx) = ProgressBus::new_pair();
        let ingestor = SharedIngestor::new(EventIngestor::new(sink, rx));
        Self { bus, ingestor }
    }

    /// Runtime backed by a [`MemorySink`]; the returned sink reads the events back.
    pub fn in_memory() -> (Self, MemorySink) {
        let sink = MemorySink::new();
        (Self::new(Box::new(sink.clone())), sink)
    }

    pub fn start_session(&self, command_name: &str) -> Result<String, ApiError> {
        let session_id = new_session_id();
        let data = SessionStartedData {
            command: command_name.to_string(),
        };
        self.emit_event(&session_id, "session_started", json!(data))?;
        Ok(session_id)
    }

    pub fn finish_session(
        &self,
        session_id: &str,
        success: bool,
        error: Option<String>,
    ) -> Result<(), ApiError> {
        let status = if success {
            SessionStatus::Completed
        } else {
            SessionStatus::Failed
        };
        let data = SessionEndedData {
            status: status.as_str().to_string(),
            error,
        };
        self.emit_event(session_id, "session_ended", json!(data))
    }

    pub fn emit_event(
        &self,
        session_id: &str,
        event_type: &str,
        data: Value,
    ) -> Result<(), ApiError> {
        self.bus
            .emit(session_id.to_string(), event_type, data)
            .map_err(to_api_error)?;
        self.ingestor.drain()?;
        Ok(())
    }

    pub fn emit_event_best_effort(&self, session_id: &str, event_type: &str, data: Value) {
        if let Err(err) = self.emit_event(session_id, event_type, data) {
            warn!(
                session_id = %session_id,
                event_type = %event_type,
                error = %err,
                "failed to emit telemetry event"
            );
        }
    }
}

fn to_api_error(err: SendError<ProgressEnvelope>) -> ApiError {
    ApiError::IoError(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        err.to_string(),
    ))
}
