//! Integration tests for orgtrack

mod cli_commands;
mod config_integration;
mod sandbox_polling;
mod telemetry_events;
mod test_utils;
mod tracker_transitions;
