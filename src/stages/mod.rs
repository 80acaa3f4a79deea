//! Staged progress primitives.
//!
//! A [`StageTracker`] owns a fixed, ordered list of named stages and derives every
//! stage's status from a single "advance to stage X" call. Renderers read it through
//! [`StageSnapshot`]s; timing instrumentation hooks in through a [`StageObserver`].

pub mod observer;
pub mod shared;
pub mod snapshot;
pub mod status;
pub mod tracker;

pub use observer::{StageEvent, StageObserver};
pub use shared::SharedStageTracker;
pub use snapshot::{StageCounts, StageSnapshot};
pub use status::StageStatus;
pub use tracker::{AdvanceOptions, StageTracker};
