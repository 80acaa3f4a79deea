//! Orgtrack CLI Binary
//!
//! Command-line interface for replaying and tracking staged org operations.

use anyhow::Context;
use clap::Parser;
use orgtrack::cli::{Cli, RunContext};
use orgtrack::config::ConfigLoader;
use orgtrack::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let context = match startup(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", orgtrack::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Initialize logging and load the workspace configuration.
fn startup(cli: &Cli) -> anyhow::Result<RunContext> {
    let logging_config = build_logging_config(cli);
    init_logging(Some(&logging_config)).context("Failed to initialize logging")?;
    info!(workspace = %cli.workspace.display(), "orgtrack starting");

    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())
        .with_context(|| format!("Failed to load configuration for {}", cli.workspace.display()))?;
    Ok(context)
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
        if config.output == "file" {
            config.output = "file+stderr".to_string();
        }
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
