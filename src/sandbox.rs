//! Sandbox creation tracking.
//!
//! The vendor side of a sandbox request is reached through [`SandboxStatusSource`];
//! this module maps the reported status onto a fixed stage pipeline and polls
//! until the copy finishes or fails.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, StageError};
use crate::poll::{poll_until, PollOptions, PollStep};
use crate::stages::{AdvanceOptions, SharedStageTracker, StageSnapshot, StageTracker};

pub const STAGE_PENDING: &str = "Pending";
pub const STAGE_PROCESSING: &str = "Processing";
pub const STAGE_ACTIVATING: &str = "Activating";
pub const STAGE_AUTHENTICATING: &str = "Authenticating";

/// Sandbox creation pipeline, in order.
pub const SANDBOX_STAGES: [&str; 4] = [
    STAGE_PENDING,
    STAGE_PROCESSING,
    STAGE_ACTIVATING,
    STAGE_AUTHENTICATING,
];

pub fn sandbox_stage_tracker() -> Result<StageTracker, StageError> {
    StageTracker::new(SANDBOX_STAGES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SandboxStatus {
    Pending,
    Processing,
    Activating,
    Completed,
    Failed,
    Deleted,
}

impl SandboxStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SandboxStatus::Pending => "Pending",
            SandboxStatus::Processing => "Processing",
            SandboxStatus::Activating => "Activating",
            SandboxStatus::Completed => "Completed",
            SandboxStatus::Failed => "Failed",
            SandboxStatus::Deleted => "Deleted",
        }
    }

    /// Pipeline stage this status corresponds to; `None` for failure statuses.
    pub fn stage(self) -> Option<&'static str> {
        match self {
            SandboxStatus::Pending => Some(STAGE_PENDING),
            SandboxStatus::Processing => Some(STAGE_PROCESSING),
            SandboxStatus::Activating => Some(STAGE_ACTIVATING),
            SandboxStatus::Completed => Some(STAGE_AUTHENTICATING),
            SandboxStatus::Failed | SandboxStatus::Deleted => None,
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, SandboxStatus::Failed | SandboxStatus::Deleted)
    }
}

impl fmt::Display for SandboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SandboxStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        [
            SandboxStatus::Pending,
            SandboxStatus::Processing,
            SandboxStatus::Activating,
            SandboxStatus::Completed,
            SandboxStatus::Failed,
            SandboxStatus::Deleted,
        ]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| ApiError::SourceError(format!("unknown sandbox status '{}'", value)))
    }
}

impl TryFrom<String> for SandboxStatus {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SandboxStatus> for String {
    fn from(status: SandboxStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One status report for a sandbox request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxProgress {
    #[serde(alias = "SandboxName")]
    pub sandbox_name: String,
    #[serde(default, alias = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "Status")]
    pub status: SandboxStatus,
    #[serde(default, alias = "CopyProgress")]
    pub copy_progress: u8,
    #[serde(default, alias = "Description", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where sandbox status reports come from.
#[async_trait]
pub trait SandboxStatusSource: Send + Sync {
    async fn fetch(&self) -> Result<SandboxProgress, ApiError>;
}

/// Replays a recorded sequence of reports; the last one repeats once exhausted.
#[derive(Debug)]
pub struct FeedSandboxSource {
    feed: Mutex<VecDeque<SandboxProgress>>,
}

impl FeedSandboxSource {
    pub fn new(feed: Vec<SandboxProgress>) -> Result<Self, ApiError> {
        if feed.is_empty() {
            return Err(ApiError::SourceError("sandbox feed is empty".to_string()));
        }
        Ok(Self {
            feed: Mutex::new(feed.into()),
        })
    }

    /// Load a JSON array of progress reports.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let feed: Vec<SandboxProgress> = serde_json::from_str(&raw)?;
        Self::new(feed)
    }
}

#[async_trait]
impl SandboxStatusSource for FeedSandboxSource {
    async fn fetch(&self) -> Result<SandboxProgress, ApiError> {
        let mut feed = self.feed.lock();
        let next = if feed.len() > 1 {
            feed.pop_front()
        } else {
            feed.front().cloned()
        };
        next.ok_or_else(|| ApiError::SourceError("sandbox feed is empty".to_string()))
    }
}

/// Poll `source` until the sandbox copy completes, advancing `tracker` along
/// [`SANDBOX_STAGES`]. `on_update` sees every report together with the tracker
/// snapshot taken right after it was applied.
///
/// On success the tracker sits on the authenticating stage; finish it with
/// [`finish_authentication`]. Failure reports and timeouts fail the current stage.
pub async fn track_sandbox<S, F>(
    source: &S,
    tracker: &SharedStageTracker,
    options: PollOptions,
    on_update: F,
) -> Result<SandboxProgress, ApiError>
where
    S: SandboxStatusSource + ?Sized,
    F: FnMut(&SandboxProgress, &StageSnapshot),
{
    let on_update = &RefCell::new(on_update);
    let result = poll_until("sandbox creation", options, move || async move {
        let progress = source.fetch().await?;
        match progress.status.stage() {
            Some(stage) => tracker.advance(stage, AdvanceOptions::default())?,
            None => {
                if tracker.fail_current().is_none() {
                    tracker.advance(STAGE_PENDING, AdvanceOptions::error())?;
                }
            }
        }
        let snapshot = tracker.snapshot();
        {
            let mut update = on_update.borrow_mut();
            (*update)(&progress, &snapshot);
        }

        if progress.status.is_failure() {
            return Err(ApiError::SandboxFailed {
                name: progress.sandbox_name.clone(),
                reason: progress
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("status {}", progress.status)),
            });
        }
        if progress.status == SandboxStatus::Completed {
            info!(sandbox = %progress.sandbox_name, "sandbox copy completed");
            return Ok(PollStep::Done(progress));
        }
        Ok(PollStep::Pending)
    })
    .await;

    if let Err(ApiError::PollTimeout { .. }) = &result {
        let failed = tracker.fail_current();
        warn!(stage = ?failed, "sandbox creation timed out");
    }
    result
}

/// Close the authenticating stage: completed on success, failed otherwise.
pub fn finish_authentication(tracker: &SharedStageTracker, ok: bool) -> Result<(), ApiError> {
    let options = if ok {
        AdvanceOptions::stopping()
    } else {
        AdvanceOptions::error()
    };
    tracker.advance(STAGE_AUTHENTICATING, options)?;
    Ok(())
}
