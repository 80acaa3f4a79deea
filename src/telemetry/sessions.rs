//! Command sessions: status policy and the runtime that brackets events.

pub mod policy;
pub mod service;

pub use service::TelemetryRuntime;
