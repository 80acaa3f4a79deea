//! CLI presentation: text, table and json formatters for stage pipelines.

mod stages;

pub use stages::{OutputFormat, StageRenderer};
