//! Replay scripts: a stage list plus a sequence of tracker steps, stored as TOML.
//!
//! ```toml
//! stages = ["Pending", "Processing", "Activating"]
//!
//! [[steps]]
//! advance = "Processing"
//!
//! [[steps]]
//! advance = "Activating"
//! error = true
//!
//! [[steps]]
//! set = "Pending"
//! status = "completed"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ApiError;
use crate::stages::{AdvanceOptions, StageStatus, StageTracker};

#[derive(Debug, Clone, Default, Deserialize)]
struct RawStep {
    advance: Option<String>,
    set: Option<String>,
    status: Option<String>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    stop: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct RawScript {
    stages: Vec<String>,
    #[serde(default)]
    steps: Vec<RawStep>,
}

/// A validated tracker operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStep {
    Advance {
        stage: String,
        options: AdvanceOptions,
    },
    Set {
        stage: String,
        status: StageStatus,
    },
}

impl ReplayStep {
    pub fn apply(&self, tracker: &mut StageTracker) -> Result<(), ApiError> {
        match self {
            ReplayStep::Advance { stage, options } => tracker.advance(stage, *options)?,
            ReplayStep::Set { stage, status } => tracker.set(stage, *status)?,
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        match self {
            ReplayStep::Advance { stage, options } if options.has_error => {
                format!("advance {} (error)", stage)
            }
            ReplayStep::Advance { stage, options } if options.is_stopping => {
                format!("advance {} (stop)", stage)
            }
            ReplayStep::Advance { stage, .. } => format!("advance {}", stage),
            ReplayStep::Set { stage, status } => format!("set {} {}", stage, status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayScript {
    pub stages: Vec<String>,
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let raw: RawScript = toml::from_str(raw)?;
        let steps = raw
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| convert_step(index + 1, step))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            stages: raw.stages,
            steps,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ApiError::InvalidScript(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
    }

    pub fn tracker(&self) -> Result<StageTracker, ApiError> {
        Ok(StageTracker::new(self.stages.iter().cloned())?)
    }

    /// Apply every step in order; stops at the first step the tracker rejects.
    pub fn apply(&self, tracker: &mut StageTracker) -> Result<(), ApiError> {
        for step in &self.steps {
            step.apply(tracker)?;
        }
        Ok(())
    }
}

fn convert_step(number: usize, step: RawStep) -> Result<ReplayStep, ApiError> {
    match (step.advance, step.set) {
        (Some(stage), None) => {
            if step.status.is_some() {
                return Err(invalid(number, "'status' only applies to 'set' steps"));
            }
            Ok(ReplayStep::Advance {
                stage,
                options: AdvanceOptions {
                    has_error: step.error,
                    is_stopping: step.stop,
                },
            })
        }
        (None, Some(stage)) => {
            let status = step
                .status
                .ok_or_else(|| invalid(number, "'set' requires a 'status'"))?
                .parse::<StageStatus>()
                .map_err(|_| invalid(number, "unknown status"))?;
            Ok(ReplayStep::Set { stage, status })
        }
        (Some(_), Some(_)) => Err(invalid(number, "use either 'advance' or 'set', not both")),
        (None, None) => Err(invalid(number, "expected 'advance' or 'set'")),
    }
}

fn invalid(number: usize, message: &str) -> ApiError {
    ApiError::InvalidScript(format!("step {}: {}", number, message))
}
