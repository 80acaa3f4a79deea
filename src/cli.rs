//! CLI domain: parse, route, output, and presentation only.
//! Tracking logic lives in the stage, sandbox and replay modules; the route table dispatches to them.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{OutputFormat, StageRenderer};
pub use route::{command_name, RunContext};
