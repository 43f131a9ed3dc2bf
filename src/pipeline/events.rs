// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Structured stage events
//!
//! Every stage completion is recorded as a timestamped event. The log
//! doubles as the human console trace (`build ok` / `test failed`) and as
//! a machine-checkable record of what ran and in what order.

use chrono::{DateTime, Utc};
use colored::Colorize;
use tracing::info;

/// How a stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "ok",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// One recorded stage completion
#[derive(Debug, Clone)]
pub struct StageEvent {
    pub stage: String,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

/// Ordered trace of stage completions for one run
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<StageEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stage completion; also emits the console line
    pub fn record(&mut self, stage: &str, outcome: Outcome) {
        match outcome {
            Outcome::Succeeded => println!("  {} {}", "✓".green(), stage),
            Outcome::Failed => println!("  {} {} failed", "✗".red(), stage),
            Outcome::Skipped => println!("  {} {} skipped", "-".dimmed(), stage),
        }
        info!(stage, outcome = outcome.as_str(), "stage finished");

        self.events.push(StageEvent {
            stage: stage.to_string(),
            outcome,
            timestamp: Utc::now(),
        });
    }

    pub fn events(&self) -> &[StageEvent] {
        &self.events
    }

    /// Stage names in completion order
    pub fn trace(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.stage.as_str()).collect()
    }

    /// Events for stages that actually executed (not skipped)
    pub fn executed(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.outcome != Outcome::Skipped)
            .map(|e| e.stage.as_str())
            .collect()
    }
}
