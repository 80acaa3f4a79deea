//! Stage pipeline rendering: live frames and the final summary.

use std::fmt;
use std::str::FromStr;

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

use crate::config::OUTPUT_FORMATS;
use crate::error::ApiError;
use crate::format::format_duration;
use crate::stages::{StageSnapshot, StageStatus};
use crate::telemetry::StageTiming;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Invalid output format: {} (must be one of {})",
                other,
                OUTPUT_FORMATS.join(", ")
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        })
    }
}

/// Renders tracker snapshots. `tick` advances the spinner shown for the current stage.
#[derive(Debug, Clone)]
pub struct StageRenderer {
    format: OutputFormat,
    color: bool,
    tick: usize,
}

impl StageRenderer {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self {
            format,
            color,
            tick: 0,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// One live frame, or `None` when the output is JSON.
    pub fn frame(&mut self, snapshot: &StageSnapshot) -> Option<String> {
        if self.format == OutputFormat::Json {
            return None;
        }
        let frame = self.lines(snapshot);
        self.tick = self.tick.wrapping_add(1);
        Some(frame)
    }

    /// Final rendering with per-stage durations where known.
    pub fn finish(
        &self,
        snapshot: &StageSnapshot,
        timings: &[StageTiming],
    ) -> Result<String, ApiError> {
        match self.format {
            OutputFormat::Text => Ok(format!("{}\n{}", self.lines(snapshot), summary(snapshot))),
            OutputFormat::Table => Ok(self.table(snapshot, timings)),
            OutputFormat::Json => {
                let stages: Vec<_> = snapshot
                    .stages
                    .iter()
                    .map(|entry| {
                        json!({
                            "stage": entry.stage,
                            "status": entry.status,
                            "duration_ms": duration_of(timings, &entry.stage)
                                .map(|timing| timing.duration.as_millis() as u64),
                        })
                    })
                    .collect();
                let out = json!({
                    "stages": stages,
                    "current": snapshot.current,
                    "counts": snapshot.counts(),
                    "finished": snapshot.is_finished(),
                });
                Ok(serde_json::to_string_pretty(&out)?)
            }
        }
    }

    pub fn icon(&self, status: StageStatus) -> String {
        let glyph = match status {
            StageStatus::Pending => "◌",
            StageStatus::Current => SPINNER[self.tick % SPINNER.len()],
            StageStatus::Completed => "✔",
            StageStatus::Skipped => "◯",
            StageStatus::Failed => "✘",
        };
        if !self.color {
            return glyph.to_string();
        }
        match status {
            StageStatus::Pending => glyph.dimmed().to_string(),
            StageStatus::Current => glyph.cyan().to_string(),
            StageStatus::Completed => glyph.green().to_string(),
            StageStatus::Skipped => glyph.yellow().to_string(),
            StageStatus::Failed => glyph.red().to_string(),
        }
    }

    fn lines(&self, snapshot: &StageSnapshot) -> String {
        snapshot
            .stages
            .iter()
            .map(|entry| {
                let label = if entry.status == StageStatus::Current && self.color {
                    entry.stage.bold().to_string()
                } else {
                    entry.stage.clone()
                };
                format!("{} {}", self.icon(entry.status), label)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table(&self, snapshot: &StageSnapshot, timings: &[StageTiming]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["", "Stage", "Status", "Duration"]);
        for entry in &snapshot.stages {
            let duration = duration_of(timings, &entry.stage)
                .map(|timing| format_duration(timing.duration))
                .unwrap_or_else(|| "-".to_string());
            table.add_row(vec![
                self.icon(entry.status),
                entry.stage.clone(),
                entry.status.to_string(),
                duration,
            ]);
        }
        table.to_string()
    }
}

/// Latest timing recorded for `stage`; a re-entered stage keeps its last visit.
fn duration_of<'a>(timings: &'a [StageTiming], stage: &str) -> Option<&'a StageTiming> {
    timings.iter().rev().find(|timing| timing.stage == stage)
}

fn summary(snapshot: &StageSnapshot) -> String {
    let counts = snapshot.counts();
    let mut parts = Vec::new();
    for (count, label) in [
        (counts.completed, "completed"),
        (counts.current, "current"),
        (counts.failed, "failed"),
        (counts.skipped, "skipped"),
        (counts.pending, "pending"),
    ] {
        if count > 0 {
            parts.push(format!("{} {}", count, label));
        }
    }
    format!("{} stages: {}", counts.total(), parts.join(", "))
}
