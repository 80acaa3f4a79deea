//! Telemetry domain: events, sessions, routing, sinks, and stage timing.

mod types;

pub mod events;
pub mod routing;
pub mod sessions;
pub mod sinks;
pub mod timer;

pub use events::{
    ProgressEnvelope, ProgressEvent, SessionEndedData, SessionStartedData, StageEnteredData,
    StageExitedData,
};
pub use sessions::policy::SessionStatus;
pub use sessions::TelemetryRuntime;
pub use sinks::{EventSink, JsonlSink, MemorySink};
pub use timer::{StageTimer, StageTiming, TimingLog};
pub use types::{new_session_id, now_millis};
