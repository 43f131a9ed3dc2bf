// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Pipeline controller
//!
//! Sequences the nightly stages: sync, build, then the independent
//! build-dependent stages (test, docs, doccheck, analysis), then the
//! optional comparison stages, then publishing. A failed sync reuses the
//! previous report with a banner; a failed build publishes a minimal
//! failure page and notifies; everything downstream of a failed build is
//! skipped. Every terminal state exits zero with a page published.

use colored::Colorize;
use std::path::Path;
use tracing::info;

use crate::config::RunConfiguration;
use crate::errors::NightbuildResult;
use crate::notify::{log_tail, Notify, TAIL_LINES};
use crate::parser::parse_test_log;
use crate::pipeline::capability::{comparison_capability, graph_capability, Capability};
use crate::pipeline::events::{EventLog, Outcome};
use crate::pipeline::state::{PipelineState, StageKind};
use crate::publish::{Publisher, CONFIG_COPY_NAME};
use crate::report::{
    self, render_index_page, templates, Link, SectionRow, StageOutcome,
};
use crate::runner::{CommandRunner, StepResult};

/// How a pipeline run ended. All variants exit zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Full report published
    Published,
    /// Version control unreachable; previous report annotated
    SyncFailed,
    /// Build failed; minimal failure page published
    BuildFailed,
}

/// Drives one nightly run from sync to publish
pub struct PipelineController<'a> {
    config: &'a RunConfiguration,
    config_path: &'a Path,
    runner: &'a dyn CommandRunner,
    notifier: &'a dyn Notify,
    events: EventLog,
}

impl<'a> PipelineController<'a> {
    pub fn new(
        config: &'a RunConfiguration,
        config_path: &'a Path,
        runner: &'a dyn CommandRunner,
        notifier: &'a dyn Notify,
    ) -> Self {
        Self {
            config,
            config_path,
            runner,
            notifier,
            events: EventLog::new(),
        }
    }

    /// Structured trace of stage completions for this run
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Execute the whole pipeline
    pub async fn run(&mut self, state: &mut PipelineState) -> NightbuildResult<RunOutcome> {
        let publisher = Publisher::new(self.config, self.runner);

        if state.dry_run {
            println!("{}", "Doing dry run".bold());
            self.assume_prior_results(state);
        } else {
            publisher.clear_stale_logs()?;

            if !self.run_sync(state).await {
                println!("Could not sync with version control. Skipping nightly build");
                publisher.annotate_previous(templates::SYNC_FAILURE_BANNER)?;
                return Ok(RunOutcome::SyncFailed);
            }

            if !self.run_stage(state, StageKind::Build).await {
                println!("Build failed. Generating error page");
                self.skip_build_dependents();
                self.publish_failure_page(state, &publisher).await?;
                return Ok(RunOutcome::BuildFailed);
            }

            for stage in StageKind::build_dependents() {
                self.run_stage(state, stage).await;
            }
        }

        self.publish_full_report(state, &publisher).await?;
        Ok(RunOutcome::Published)
    }

    /// Run the version-control sync; only its exit status matters
    async fn run_sync(&mut self, state: &mut PipelineState) -> bool {
        let log = self.config.log_path(StageKind::Sync.log_file());
        let ok = self
            .runner
            .run_for_status(&self.config.commands.sync, &log)
            .await;

        self.events.record(
            StageKind::Sync.name(),
            if ok { Outcome::Succeeded } else { Outcome::Failed },
        );
        state.record(StepResult {
            name: StageKind::Sync.name().to_string(),
            succeeded: ok,
            log_path: log,
        });
        ok
    }

    /// Run one sentinel-classified stage, recording result and event
    async fn run_stage(&mut self, state: &mut PipelineState, stage: StageKind) -> bool {
        let command = match stage {
            StageKind::Sync => unreachable!("sync uses run_sync"),
            StageKind::Build => &self.config.commands.build,
            StageKind::Test => &self.config.commands.test,
            StageKind::Docs => &self.config.commands.docs,
            StageKind::Doccheck => &self.config.commands.doccheck,
            StageKind::Analysis => &self.config.commands.analysis,
        };

        let log = self.config.log_path(stage.log_file());
        let result = self.runner.run_step(command, &log, stage.name()).await;
        let ok = result.succeeded;

        self.events.record(
            stage.name(),
            if ok { Outcome::Succeeded } else { Outcome::Failed },
        );
        state.record(result);
        ok
    }

    /// Record skip events for every stage that depends on the build
    fn skip_build_dependents(&mut self) {
        for stage in StageKind::build_dependents() {
            self.events.record(stage.name(), Outcome::Skipped);
        }
    }

    /// Dry run: reconstruct stage outcomes from whatever logs exist.
    /// Nothing is invoked; an absent log classifies as failed.
    fn assume_prior_results(&mut self, state: &mut PipelineState) {
        let stages = [
            StageKind::Build,
            StageKind::Test,
            StageKind::Docs,
            StageKind::Doccheck,
            StageKind::Analysis,
        ];
        for stage in stages {
            let log = self.config.log_path(stage.log_file());
            state.record(StepResult::from_log(stage.name(), log));
            self.events.record(stage.name(), Outcome::Skipped);
        }
    }

    /// Build-failure terminal state: minimal failure page linking the raw
    /// build log, plus one notification carrying its tail.
    async fn publish_failure_page(
        &self,
        state: &PipelineState,
        publisher: &Publisher<'_>,
    ) -> NightbuildResult<()> {
        publisher.ensure_dir()?;
        let log_link = publisher.copy_failed_build_log();
        publisher.copy_config(self.config_path);
        let banner_href = log_link
            .as_ref()
            .map(|l| l.href.clone())
            .unwrap_or_else(|| "build.log.fail".to_string());

        let row = SectionRow::new("Build:", StageOutcome::Failed { log_link });
        let page = render_index_page(
            &self.config.project_name,
            &state.date.dashed(),
            std::slice::from_ref(&row),
            self.config.per_row,
            CONFIG_COPY_NAME,
        );
        let page = report::inject_banner(&page, &templates::build_failure_banner(&banner_href));
        publisher.write_index(&page)?;

        if state.mail_enabled {
            let build_log = self.config.log_path(StageKind::Build.log_file());
            let contents = std::fs::read_to_string(&build_log).unwrap_or_default();
            self.notifier
                .notify_failure(&log_tail(&contents, TAIL_LINES), &state.date.dashed())
                .await;
        }

        Ok(())
    }

    /// Full-report terminal state: wipe, hold with the placeholder, copy
    /// every artifact, then replace the placeholder with the real page.
    async fn publish_full_report(
        &mut self,
        state: &PipelineState,
        publisher: &Publisher<'_>,
    ) -> NightbuildResult<()> {
        publisher.wipe_and_hold()?;

        let compact = state.date.compact();
        let dashed = state.date.dashed();
        let mut rows: Vec<SectionRow> = Vec::new();

        // distributable
        rows.push(match self.section_state(state, StageKind::Build) {
            SectionState::Ran => {
                let links: Vec<Link> = publisher.copy_artifact(&compact).into_iter().collect();
                SectionRow::new("Combined jar files:", StageOutcome::Success { links })
                    .with_extra(publisher.copy_log("build.log").into_iter().collect())
            }
            SectionState::Failed => SectionRow::new(
                "Combined jar files:",
                StageOutcome::Failed {
                    log_link: publisher.copy_log("build.log"),
                },
            ),
            SectionState::NeverRan => {
                SectionRow::new("Combined jar files:", StageOutcome::Skipped)
            }
        });

        // docs
        rows.push(match self.section_state(state, StageKind::Docs) {
            SectionState::Ran => {
                let (archive, browse) = publisher.publish_docs(&compact).await;
                let links = archive.into_iter().chain(browse).collect();
                SectionRow::new("Javadocs:", StageOutcome::Success { links })
                    .with_extra(publisher.copy_log("javadoc.log").into_iter().collect())
                    .with_rule()
            }
            SectionState::Failed => SectionRow::new(
                "Javadocs:",
                StageOutcome::Failed {
                    log_link: publisher.copy_log("javadoc.log"),
                },
            )
            .with_rule(),
            SectionState::NeverRan => {
                SectionRow::new("Javadocs:", StageOutcome::Skipped).with_rule()
            }
        });

        // dependency graph (optional; absent capability means no row)
        match graph_capability(self.config) {
            Capability::Available => {
                if let Some(links) = publisher.generate_dependency_graph().await {
                    rows.push(SectionRow::new(
                        "Dependency Graph:",
                        StageOutcome::Success { links },
                    ));
                }
            }
            Capability::Unavailable { reason } => {
                println!("{reason}. Skipping dependency graph");
            }
        }

        // tests
        rows.push(match self.section_state(state, StageKind::Test) {
            SectionState::Ran => {
                let links = publisher.copy_test_reports()?;
                let test_log = self.config.log_path(StageKind::Test.log_file());
                let stats = parse_test_log(&test_log).unwrap_or_default();
                let mut extra: Vec<Link> =
                    publisher.copy_log("test.log").into_iter().collect();
                extra.extend(publisher.write_summary(&stats, &dashed).ok());
                SectionRow::new("JUnit results:", StageOutcome::Success { links })
                    .with_extra(extra)
            }
            SectionState::Failed => SectionRow::new(
                "JUnit results:",
                StageOutcome::Failed {
                    log_link: publisher.copy_log("test.log"),
                },
            ),
            SectionState::NeverRan => {
                SectionRow::new("JUnit results:", StageOutcome::Skipped)
            }
        });

        // doccheck
        rows.push(match self.section_state(state, StageKind::Doccheck) {
            SectionState::Ran => SectionRow::new(
                "DocCheck results:",
                StageOutcome::Success {
                    links: publisher.copy_doccheck_tree()?,
                },
            ),
            SectionState::Failed => SectionRow::new(
                "DocCheck results:",
                StageOutcome::Failed {
                    log_link: publisher.copy_log("doccheck.log"),
                },
            ),
            SectionState::NeverRan => {
                SectionRow::new("DocCheck results:", StageOutcome::Skipped)
            }
        });

        // static analysis
        rows.push(match self.section_state(state, StageKind::Analysis) {
            SectionState::Ran => SectionRow::new(
                "PMD results:",
                StageOutcome::Success {
                    links: publisher.transform_analysis_reports().await?,
                },
            ),
            SectionState::Failed => SectionRow::new(
                "PMD results:",
                StageOutcome::Failed {
                    log_link: publisher.copy_log("pmd.log"),
                },
            ),
            SectionState::NeverRan => SectionRow::new("PMD results:", StageOutcome::Skipped),
        });

        // API comparison (optional; absent capability means no row)
        match comparison_capability(self.config) {
            Capability::Available => {
                if let Some(links) = publisher.run_api_comparison(&compact).await {
                    self.events.record("comparison", Outcome::Succeeded);
                    rows.push(SectionRow::new(
                        "API Comparison:",
                        StageOutcome::Success { links },
                    ));
                }
            }
            Capability::Unavailable { reason } => {
                println!("{reason}. Skipping API comparison");
            }
        }

        publisher.copy_config(self.config_path);

        let page = render_index_page(
            &self.config.project_name,
            &dashed,
            &rows,
            self.config.per_row,
            CONFIG_COPY_NAME,
        );
        publisher.write_index(&page)?;
        info!("report published to {}", self.config.publish_dir.display());

        Ok(())
    }

    fn section_state(&self, state: &PipelineState, stage: StageKind) -> SectionState {
        match state.result(stage) {
            Some(r) if r.succeeded => SectionState::Ran,
            Some(_) => SectionState::Failed,
            None => SectionState::NeverRan,
        }
    }
}

/// Internal view of a stage when assembling its report section
enum SectionState {
    Ran,
    Failed,
    NeverRan,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfiguration;
    use crate::pipeline::state::RunDate;
    use crate::runner::SUCCESS_SENTINEL;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Scripted runner: succeeds or fails per stage label, records calls
    struct ScriptedRunner {
        fail_stages: Vec<String>,
        fail_sync: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new() -> Self {
            Self {
                fail_stages: Vec::new(),
                fail_sync: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(stages: &[&str]) -> Self {
            Self {
                fail_stages: stages.iter().map(|s| s.to_string()).collect(),
                fail_sync: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_sync() -> Self {
            Self {
                fail_stages: Vec::new(),
                fail_sync: true,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn invocations(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    /// Notifier that records (body, date) pairs instead of sending mail
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notify for RecordingNotifier {
        async fn notify_failure(&self, body: &str, date_dashed: &str) {
            self.sent
                .lock()
                .unwrap()
                .push((body.to_string(), date_dashed.to_string()));
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run_step(&self, _command: &str, log_file: &Path, label: &str) -> StepResult {
            self.calls.lock().unwrap().push(label.to_string());
            let contents = if self.fail_stages.iter().any(|s| s == label) {
                "BUILD FAILED\nsomething broke\n".to_string()
            } else {
                format!("{SUCCESS_SENTINEL}\n")
            };
            let _ = std::fs::write(log_file, contents);
            StepResult::from_log(label, log_file.to_path_buf())
        }

        async fn run_for_status(&self, command: &str, log_file: &Path) -> bool {
            // sync is the only status-only stage invocation in these tests;
            // tool commands (tar, xsltproc) also land here and succeed
            if command.starts_with("svn") {
                self.calls.lock().unwrap().push("sync".to_string());
                let _ = std::fs::write(log_file, "At revision 1234.\n");
                return !self.fail_sync;
            }
            true
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: RunConfiguration,
        config_path: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        let work = dir.path().join("work");
        let web = dir.path().join("web");
        std::fs::create_dir_all(&repo).unwrap();
        std::fs::create_dir_all(&work).unwrap();
        std::fs::create_dir_all(&web).unwrap();

        let yaml = format!(
            "project_name: Demo\nrepo_dir: {}\nwork_dir: {}\npublish_dir: {}\n",
            repo.display(),
            work.display(),
            web.display()
        );
        let config_path = dir.path().join("nightbuild.yaml");
        std::fs::write(&config_path, &yaml).unwrap();
        let config = RunConfiguration::from_yaml(&yaml).unwrap();

        Fixture {
            _dir: dir,
            config,
            config_path,
        }
    }

    fn state() -> PipelineState {
        PipelineState::new(RunDate::from_ymd(2026, 8, 29).unwrap(), false, false)
    }

    #[tokio::test]
    async fn test_successful_run_publishes_full_report() {
        let fx = fixture();
        let runner = ScriptedRunner::new();
        let notifier = RecordingNotifier::new();
        let mut controller =
            PipelineController::new(&fx.config, &fx.config_path, &runner, &notifier);

        let mut st = state();
        let outcome = controller.run(&mut st).await.unwrap();

        assert_eq!(outcome, RunOutcome::Published);
        assert_eq!(
            runner.invocations(),
            vec!["sync", "build", "test", "docs", "doccheck", "analysis"]
        );

        let index =
            std::fs::read_to_string(fx.config.publish_dir.join("index.html")).unwrap();
        assert!(index.contains("Demo Nightly Build - 2026-08-29"));
        assert!(!index.contains("FAILED"));
    }

    #[tokio::test]
    async fn test_build_failure_skips_dependents() {
        let fx = fixture();
        let runner = ScriptedRunner::failing(&["build"]);
        let notifier = RecordingNotifier::new();
        let mut controller =
            PipelineController::new(&fx.config, &fx.config_path, &runner, &notifier);

        let mut st = state();
        let outcome = controller.run(&mut st).await.unwrap();

        assert_eq!(outcome, RunOutcome::BuildFailed);
        // no dependent stage was invoked
        assert_eq!(runner.invocations(), vec!["sync", "build"]);

        // event trace records the skips
        let events = controller.events();
        assert_eq!(
            events.trace(),
            vec!["sync", "build", "test", "docs", "doccheck", "analysis"]
        );
        assert_eq!(events.executed(), vec!["sync", "build"]);

        // mail was not enabled for this run
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_build_failure_sends_one_notification_with_log_tail() {
        let fx = fixture();
        let runner = ScriptedRunner::failing(&["build"]);
        let notifier = RecordingNotifier::new();
        let mut controller =
            PipelineController::new(&fx.config, &fx.config_path, &runner, &notifier);

        let mut st =
            PipelineState::new(RunDate::from_ymd(2026, 8, 29).unwrap(), false, true);
        let outcome = controller.run(&mut st).await.unwrap();
        assert_eq!(outcome, RunOutcome::BuildFailed);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);

        let build_log =
            std::fs::read_to_string(fx.config.log_path("build.log")).unwrap();
        assert_eq!(sent[0].0, log_tail(&build_log, TAIL_LINES));
        assert_eq!(sent[0].1, "2026-08-29");
    }

    #[tokio::test]
    async fn test_build_failure_publishes_minimal_page() {
        let fx = fixture();
        let runner = ScriptedRunner::failing(&["build"]);
        let notifier = RecordingNotifier::new();
        let mut controller =
            PipelineController::new(&fx.config, &fx.config_path, &runner, &notifier);

        let mut st = state();
        controller.run(&mut st).await.unwrap();

        let index =
            std::fs::read_to_string(fx.config.publish_dir.join("index.html")).unwrap();
        assert!(index.contains("FAILED"));
        assert!(index.contains("build.log.fail"));
        assert!(index.contains("Could not compile the sources"));
        assert!(fx.config.publish_dir.join("build.log.fail").exists());
    }

    #[tokio::test]
    async fn test_sync_failure_annotates_previous_report() {
        let fx = fixture();
        std::fs::write(
            fx.config.publish_dir.join("index.html"),
            "<html><body><h2>Demo Nightly Build - 2026-08-28</h2></body></html>",
        )
        .unwrap();

        let runner = ScriptedRunner::failing_sync();
        let notifier = RecordingNotifier::new();
        let mut controller =
            PipelineController::new(&fx.config, &fx.config_path, &runner, &notifier);

        let mut st = state();
        let outcome = controller.run(&mut st).await.unwrap();

        assert_eq!(outcome, RunOutcome::SyncFailed);
        // nothing but sync ran
        assert_eq!(runner.invocations(), vec!["sync"]);

        let index =
            std::fs::read_to_string(fx.config.publish_dir.join("index.html")).unwrap();
        assert!(index.contains("Could not sync"));
        assert!(index.contains("2026-08-28"));
    }

    #[tokio::test]
    async fn test_stage_failure_does_not_block_siblings() {
        let fx = fixture();
        let runner = ScriptedRunner::failing(&["test"]);
        let notifier = RecordingNotifier::new();
        let mut controller =
            PipelineController::new(&fx.config, &fx.config_path, &runner, &notifier);

        let mut st = state();
        let outcome = controller.run(&mut st).await.unwrap();

        assert_eq!(outcome, RunOutcome::Published);
        // docs, doccheck, and analysis still ran after the test failure
        assert_eq!(
            runner.invocations(),
            vec!["sync", "build", "test", "docs", "doccheck", "analysis"]
        );

        let index =
            std::fs::read_to_string(fx.config.publish_dir.join("index.html")).unwrap();
        assert!(index.contains("FAILED"));
        assert!(index.contains("test.log"));
    }

    #[tokio::test]
    async fn test_dry_run_invokes_nothing() {
        let fx = fixture();
        // leave behind plausible prior logs
        std::fs::write(fx.config.log_path("build.log"), SUCCESS_SENTINEL).unwrap();
        std::fs::write(fx.config.log_path("test.log"), SUCCESS_SENTINEL).unwrap();
        std::fs::write(fx.config.log_path("javadoc.log"), SUCCESS_SENTINEL).unwrap();
        std::fs::write(fx.config.log_path("doccheck.log"), SUCCESS_SENTINEL).unwrap();
        std::fs::write(fx.config.log_path("pmd.log"), "BUILD FAILED").unwrap();

        let runner = ScriptedRunner::new();
        let notifier = RecordingNotifier::new();
        let mut controller =
            PipelineController::new(&fx.config, &fx.config_path, &runner, &notifier);

        let mut st =
            PipelineState::new(RunDate::from_ymd(2026, 8, 29).unwrap(), true, false);
        let outcome = controller.run(&mut st).await.unwrap();

        assert_eq!(outcome, RunOutcome::Published);
        // only status-only tool commands may have run; no stage was invoked
        assert!(runner.invocations().is_empty());
        assert!(controller.events().executed().is_empty());

        // the reconstructed analysis failure degrades its section
        let index =
            std::fs::read_to_string(fx.config.publish_dir.join("index.html")).unwrap();
        assert!(index.contains("FAILED"));
    }

    #[tokio::test]
    async fn test_full_report_copies_config_and_summary() {
        let fx = fixture();
        // give the test stage a parsable log with one module block
        let runner = ScriptedRunner::new();

        // seed per-module reports so the test section has links
        let reports = fx.config.repo_dir.join("reports");
        std::fs::create_dir_all(&reports).unwrap();
        std::fs::write(reports.join("result-core.txt"), "ok").unwrap();

        let notifier = RecordingNotifier::new();
        let mut controller =
            PipelineController::new(&fx.config, &fx.config_path, &runner, &notifier);
        let mut st = state();
        controller.run(&mut st).await.unwrap();

        assert!(fx.config.publish_dir.join(CONFIG_COPY_NAME).exists());
        assert!(fx.config.publish_dir.join("junitsummary.html").exists());
        assert!(fx.config.publish_dir.join("test/result-core.txt").exists());

        let index =
            std::fs::read_to_string(fx.config.publish_dir.join("index.html")).unwrap();
        assert!(index.contains("test/result-core.txt"));
        assert!(index.contains("junitsummary.html"));
    }
}
