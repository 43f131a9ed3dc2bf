// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! nightbuild - Nightly Build Orchestrator
//!
//! Sync, build, test, analyze, publish.

use clap::Parser;
use colored::Colorize;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nightbuild::cli::{Cli, RunOptions, USAGE};
use nightbuild::notify::Notifier;
use nightbuild::pipeline::{PipelineController, PipelineState, RunDate};
use nightbuild::probe::check_environment;
use nightbuild::runner::ProcessRunner;
use nightbuild::RunConfiguration;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nightbuild=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    let options = RunOptions::from_tokens(&cli.tokens);
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = RunConfiguration::from_file(&cli.config)?;

    // Probe the environment before anything runs; this is the only path
    // that exits nonzero.
    let report = check_environment(&config.required_executables, &config.required_env_vars);
    for name in &report.missing_execs {
        println!("Could not find required executable: {name}");
    }
    for name in &report.missing_envs {
        println!("Required environment variable not set: {name}");
    }
    report.into_error()?;

    println!();
    println!("{}", "Variable settings".bold());
    println!("  repo_dir    = {}", config.repo_dir.display());
    println!("  work_dir    = {}", config.work_dir.display());
    println!("  publish_dir = {}", config.publish_dir.display());
    println!();

    let mut state = PipelineState::new(RunDate::today(), options.dry_run, !options.no_mail);
    let runner = ProcessRunner::new(config.repo_dir.clone());
    let notifier = Notifier::new(&config.mail, &config.project_name);
    let mut controller = PipelineController::new(&config, &cli.config, &runner, &notifier);

    // Every completed run exits zero; sync and build failures are terminal
    // report states, not process errors.
    let outcome = controller.run(&mut state).await?;

    if cli.verbose {
        println!();
        println!("Stage trace:");
        for event in controller.events().events() {
            println!(
                "  {} {} ({})",
                event.timestamp.format("%H:%M:%S"),
                event.stage,
                event.outcome.as_str()
            );
        }
    }

    println!();
    println!("{}", format!("Run finished: {:?}", outcome).bold());

    Ok(())
}
