// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Pipeline state
//!
//! [`PipelineState`] is owned exclusively by the controller, appended to as
//! stages complete, and handed read-only to the renderer and publisher.

use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;

use crate::runner::StepResult;

/// Named pipeline stages, in sequencing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Sync,
    Build,
    Test,
    Docs,
    Doccheck,
    Analysis,
}

impl StageKind {
    /// Stage label used in state, events, and console output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Build => "build",
            Self::Test => "test",
            Self::Docs => "docs",
            Self::Doccheck => "doccheck",
            Self::Analysis => "analysis",
        }
    }

    /// Log file the stage writes in the working directory
    pub fn log_file(&self) -> &'static str {
        match self {
            Self::Sync => "sync.log",
            Self::Build => "build.log",
            Self::Test => "test.log",
            Self::Docs => "javadoc.log",
            Self::Doccheck => "doccheck.log",
            Self::Analysis => "pmd.log",
        }
    }

    /// Stages that only run after a successful build
    pub fn build_dependents() -> [StageKind; 4] {
        [Self::Test, Self::Docs, Self::Doccheck, Self::Analysis]
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Calendar date of the run, formatted once for filenames and titles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDate(NaiveDate);

impl RunDate {
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Compact form for filenames, e.g. `20260829`
    pub fn compact(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    /// Dashed form for titles and mail subjects, e.g. `2026-08-29`
    pub fn dashed(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

/// State accumulated over one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Calendar date used for filenames and titles
    pub date: RunDate,

    /// Whether sync/build stages were bypassed
    pub dry_run: bool,

    /// Whether failure notification is allowed
    pub mail_enabled: bool,

    /// Completed stage results, keyed by stage name
    step_results: BTreeMap<String, StepResult>,
}

impl PipelineState {
    pub fn new(date: RunDate, dry_run: bool, mail_enabled: bool) -> Self {
        Self {
            date,
            dry_run,
            mail_enabled,
            step_results: BTreeMap::new(),
        }
    }

    /// Append a completed stage result
    pub fn record(&mut self, result: StepResult) {
        self.step_results.insert(result.name.clone(), result);
    }

    /// Result of a stage, if it ran
    pub fn result(&self, stage: StageKind) -> Option<&StepResult> {
        self.step_results.get(stage.name())
    }

    /// True only when the stage ran and its log carried the sentinel.
    /// A stage that never ran counts as not succeeded.
    pub fn succeeded(&self, stage: StageKind) -> bool {
        self.result(stage).map(|r| r.succeeded).unwrap_or(false)
    }
}
