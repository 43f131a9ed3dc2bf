// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Step runner
//!
//! Executes one external command per stage, redirecting combined output to
//! a log file, and classifies the stage by scanning the log for the build
//! tool's success sentinel. This is the only place external build
//! processes are spawned. Command failure is never an error: it is
//! represented in the returned [`StepResult`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Literal whose presence in a stage log is the sole success signal
pub const SUCCESS_SENTINEL: &str = "BUILD SUCCESSFUL";

/// Outcome of one stage invocation. Immutable once produced.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Stage label (build, test, docs, ...)
    pub name: String,

    /// Whether the log carried the success sentinel
    pub succeeded: bool,

    /// Log file the stage wrote to
    pub log_path: PathBuf,
}

impl StepResult {
    /// Classify an existing log file without running anything.
    ///
    /// Used by dry-run mode to reconstruct prior outcomes: an absent log
    /// classifies as failed, same as a log without the sentinel.
    pub fn from_log(name: &str, log_path: PathBuf) -> Self {
        let succeeded = classify_log(&log_path);
        Self {
            name: name.to_string(),
            succeeded,
            log_path,
        }
    }
}

/// True iff the log file exists and contains [`SUCCESS_SENTINEL`]
pub fn classify_log(path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents.contains(SUCCESS_SENTINEL),
        Err(_) => false,
    }
}

/// Seam for stage execution.
///
/// The pipeline controller only talks to this trait, so tests can swap in
/// a recording runner and verify exactly which stages were invoked.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` through the shell, write combined output to
    /// `log_file`, and classify the result by the success sentinel.
    async fn run_step(&self, command: &str, log_file: &Path, label: &str) -> StepResult;

    /// Run `command` through the shell and report only its exit status.
    /// Used for the version-control sync, where the log carries no
    /// sentinel and exit status is the only signal.
    async fn run_for_status(&self, command: &str, log_file: &Path) -> bool;
}

/// Process-backed runner executing commands via `bash -c` in the source
/// tree, the same way the build tool would be driven from a login shell.
pub struct ProcessRunner {
    repo_dir: PathBuf,
}

impl ProcessRunner {
    pub fn new(repo_dir: PathBuf) -> Self {
        Self { repo_dir }
    }

    /// Spawn the command and write stdout followed by stderr to the log
    /// file, overwriting any previous run's log. Spawn and write failures
    /// leave the log absent or sentinel-free, which classifies as failure.
    async fn capture_to_log(&self, command: &str, log_file: &Path) -> Option<std::process::ExitStatus> {
        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(command);
        cmd.current_dir(&self.repo_dir);

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => {
                debug!("failed to spawn '{}': {}", command, e);
                return None;
            }
        };

        let mut log = output.stdout.clone();
        log.extend_from_slice(&output.stderr);

        if let Err(e) = std::fs::write(log_file, &log) {
            debug!("failed to write log '{}': {}", log_file.display(), e);
            return None;
        }

        Some(output.status)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run_step(&self, command: &str, log_file: &Path, label: &str) -> StepResult {
        debug!("running stage '{}': {}", label, command);
        self.capture_to_log(command, log_file).await;
        StepResult::from_log(label, log_file.to_path_buf())
    }

    async fn run_for_status(&self, command: &str, log_file: &Path) -> bool {
        debug!("running sync: {}", command);
        match self.capture_to_log(command, log_file).await {
            Some(status) => status.success(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_classify_log_with_sentinel() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("build.log");
        std::fs::write(&log, "compiling...\nBUILD SUCCESSFUL\nTotal time: 3 minutes\n").unwrap();
        assert!(classify_log(&log));
    }

    #[test]
    fn test_classify_log_without_sentinel() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("build.log");
        std::fs::write(&log, "compiling...\nBUILD FAILED\n").unwrap();
        assert!(!classify_log(&log));
    }

    #[test]
    fn test_classify_empty_log_fails() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("build.log");
        std::fs::write(&log, "").unwrap();
        assert!(!classify_log(&log));
    }

    #[test]
    fn test_classify_missing_log_fails() {
        let dir = tempdir().unwrap();
        assert!(!classify_log(&dir.path().join("no-such.log")));
    }

    #[tokio::test]
    async fn test_run_step_success() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("build.log");
        let runner = ProcessRunner::new(dir.path().to_path_buf());

        let result = runner
            .run_step("echo BUILD SUCCESSFUL", &log, "build")
            .await;

        assert!(result.succeeded);
        assert_eq!(result.name, "build");
        assert_eq!(result.log_path, log);
    }

    #[tokio::test]
    async fn test_run_step_failure_is_not_an_error() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("build.log");
        let runner = ProcessRunner::new(dir.path().to_path_buf());

        // Command fails and never prints the sentinel
        let result = runner.run_step("echo broken; exit 3", &log, "build").await;

        assert!(!result.succeeded);
        assert!(log.exists());
    }

    #[tokio::test]
    async fn test_run_step_captures_stderr() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("stage.log");
        let runner = ProcessRunner::new(dir.path().to_path_buf());

        runner
            .run_step("echo 'BUILD SUCCESSFUL' 1>&2", &log, "stage")
            .await;

        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.contains(SUCCESS_SENTINEL));
    }

    #[tokio::test]
    async fn test_run_for_status_reports_exit_code() {
        let dir = tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path().to_path_buf());

        assert!(runner.run_for_status("true", &dir.path().join("a.log")).await);
        assert!(!runner.run_for_status("false", &dir.path().join("b.log")).await);
    }
}
