//! CLI route: single route table and run context. Dispatches to tracking services and presentation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use crate::cli::parse::Commands;
use crate::cli::presentation::{OutputFormat, StageRenderer};
use crate::config::{ConfigLoader, OrgtrackConfig};
use crate::error::ApiError;
use crate::format::{sandbox_status_line, seconds_to_human};
use crate::poll::{wait_for_domain, DnsResolver, PollOptions, RetryPolicy};
use crate::replay::ReplayScript;
use crate::sandbox::{
    finish_authentication, sandbox_stage_tracker, track_sandbox, FeedSandboxSource,
};
use crate::stages::SharedStageTracker;
use crate::telemetry::{JsonlSink, MemorySink, StageTimer, TelemetryRuntime};

/// Command name string for sessions and telemetry.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Replay { .. } => "replay",
        Commands::Sandbox { .. } => "sandbox",
        Commands::Duration { .. } => "duration",
    }
}

/// Runtime context for CLI execution: workspace and loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: OrgtrackConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &OrgtrackConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table, inside a telemetry session.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let telemetry = open_telemetry(command)?;
        let session_id = telemetry.start_session(command_name(command))?;
        let result = self.execute_inner(command, &telemetry, &session_id);
        let err = result.as_ref().err().map(|e| e.to_string());
        if let Err(e) = telemetry.finish_session(&session_id, result.is_ok(), err) {
            warn!(session_id = %session_id, error = %e, "failed to close telemetry session");
        }
        result
    }

    fn execute_inner(
        &self,
        command: &Commands,
        telemetry: &TelemetryRuntime,
        session_id: &str,
    ) -> Result<String, ApiError> {
        match command {
            Commands::Replay {
                script,
                format,
                frames,
                ..
            } => self.handle_replay(script, format.as_deref(), *frames, telemetry, session_id),
            Commands::Sandbox {
                feed,
                interval_ms,
                timeout_secs,
                login_url,
                format,
                ..
            } => {
                let mut options = PollOptions::from(&self.config.polling);
                if let Some(ms) = interval_ms {
                    options.interval = Duration::from_millis(*ms);
                }
                if let Some(secs) = timeout_secs {
                    options.timeout = Duration::from_secs(*secs);
                }
                self.handle_sandbox(
                    feed,
                    options,
                    login_url.as_deref(),
                    format.as_deref(),
                    telemetry,
                    session_id,
                )
            }
            Commands::Duration { seconds } => Ok(seconds_to_human(*seconds)),
        }
    }

    fn renderer(&self, format: Option<&str>) -> Result<StageRenderer, ApiError> {
        let format: OutputFormat = format
            .unwrap_or(self.config.render.format.as_str())
            .parse()?;
        Ok(StageRenderer::new(format, self.config.render.color))
    }

    fn handle_replay(
        &self,
        script_path: &Path,
        format: Option<&str>,
        frames: bool,
        telemetry: &TelemetryRuntime,
        session_id: &str,
    ) -> Result<String, ApiError> {
        let mut renderer = self.renderer(format)?;
        let script = ReplayScript::load(script_path)?;
        let timer = StageTimer::new().with_telemetry(telemetry.clone(), session_id);
        let timings = timer.log();
        let mut tracker = script.tracker()?;
        tracker.set_observer(timer);

        let mut out = Vec::new();
        for (index, step) in script.steps.iter().enumerate() {
            step.apply(&mut tracker)?;
            if frames {
                if let Some(frame) = renderer.frame(&tracker.snapshot()) {
                    out.push(format!("step {}: {}\n{}\n", index + 1, step.describe(), frame));
                }
            }
        }
        info!(
            script = %script_path.display(),
            steps = script.steps.len(),
            "replay finished"
        );

        out.push(renderer.finish(&tracker.snapshot(), &timings.timings())?);
        Ok(out.join("\n"))
    }

    fn handle_sandbox(
        &self,
        feed: &Path,
        options: PollOptions,
        login_url: Option<&str>,
        format: Option<&str>,
        telemetry: &TelemetryRuntime,
        session_id: &str,
    ) -> Result<String, ApiError> {
        let mut renderer = self.renderer(format)?;
        let source = FeedSandboxSource::from_path(feed)?;
        let timer = StageTimer::new().with_telemetry(telemetry.clone(), session_id);
        let timings = timer.log();
        let tracker = SharedStageTracker::new(sandbox_stage_tracker()?.with_observer(timer));
        let polling = &self.config.polling;
        let domain_policy = RetryPolicy::within(
            Duration::from_secs(polling.domain_retry_secs),
            Duration::from_millis(polling.domain_retry_interval_ms),
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (progress, elapsed) = runtime.block_on(async {
            let started = tokio::time::Instant::now();
            let progress = track_sandbox(&source, &tracker, options, |progress, snapshot| {
                telemetry.emit_event_best_effort(session_id, "sandbox_progress", json!(progress));
                if let Some(frame) = renderer.frame(snapshot) {
                    eprintln!(
                        "{}\n{}",
                        sandbox_status_line(progress, started.elapsed()),
                        frame
                    );
                }
            })
            .await?;

            let authenticated = match login_url {
                Some(url) => wait_for_domain(&DnsResolver, url, domain_policy).await,
                None => Ok(Vec::new()),
            };
            finish_authentication(&tracker, authenticated.is_ok())?;
            if let Err(e) = authenticated {
                return Err(e);
            }
            Ok::<_, ApiError>((progress, started.elapsed()))
        })?;

        let summary = renderer.finish(&tracker.snapshot(), &timings.timings())?;
        if renderer.format() == OutputFormat::Json {
            return Ok(summary);
        }
        Ok(format!(
            "{}\n{}",
            sandbox_status_line(&progress, elapsed),
            summary
        ))
    }
}

fn open_telemetry(command: &Commands) -> Result<TelemetryRuntime, ApiError> {
    let events = match command {
        Commands::Replay { events, .. } | Commands::Sandbox { events, .. } => events.as_ref(),
        Commands::Duration { .. } => None,
    };
    Ok(match events {
        Some(path) => TelemetryRuntime::new(Box::new(JsonlSink::open(path)?)),
        None => TelemetryRuntime::new(Box::new(MemorySink::new())),
    })
}
