//! Orgtrack: Staged Progress Tracking
//!
//! Tracks long-running org operations (sandbox copies, scratch org creation) as a
//! fixed, ordered pipeline of stages and classifies every stage as pending,
//! current, completed, skipped or failed as the operation moves along.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod poll;
pub mod replay;
pub mod sandbox;
pub mod stages;
pub mod telemetry;
