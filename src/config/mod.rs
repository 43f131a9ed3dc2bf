// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Run configuration
//!
//! Defines the schema for nightbuild.yaml files. A [`RunConfiguration`] is
//! loaded once at startup and passed immutably to every component that
//! needs it; there is no process-wide mutable state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::NightbuildError;

/// Run configuration from nightbuild.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfiguration {
    /// Project name used in page titles and mail subjects
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Version-controlled source tree (the build tool runs here)
    pub repo_dir: PathBuf,

    /// Working directory holding per-stage log files
    pub work_dir: PathBuf,

    /// Web-accessible directory rebuilt once per run
    pub publish_dir: PathBuf,

    /// How many links to place on one report row before wrapping
    #[serde(default = "default_per_row")]
    pub per_row: usize,

    /// Executables that must resolve on PATH before anything runs
    #[serde(default = "default_executables")]
    pub required_executables: Vec<String>,

    /// Environment variables that must be set before anything runs
    #[serde(default = "default_env_vars")]
    pub required_env_vars: Vec<String>,

    /// File name prefix for the distributable artifact
    #[serde(default = "default_artifact_prefix")]
    pub artifact_prefix: String,

    /// Directory (relative to repo_dir) where the build drops the artifact
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Directory (relative to repo_dir) holding generated API docs
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    /// Directory (relative to repo_dir) holding doccheck report subtrees
    #[serde(default = "default_doccheck_dir")]
    pub doccheck_dir: PathBuf,

    /// Directory (relative to repo_dir) holding per-module test results
    #[serde(default = "default_test_reports_dir")]
    pub test_reports_dir: PathBuf,

    /// Directory (relative to repo_dir) holding analysis XML reports
    #[serde(default = "default_analysis_dir")]
    pub analysis_dir: PathBuf,

    /// Stylesheet (relative to repo_dir) for the XML-to-HTML transform
    #[serde(default = "default_stylesheet")]
    pub analysis_stylesheet: PathBuf,

    /// Per-stage command lines
    #[serde(default)]
    pub commands: StageCommands,

    /// Failure-notification settings
    #[serde(default)]
    pub mail: MailConfig,

    /// Dependency-graph generation settings
    #[serde(default)]
    pub graph: GraphConfig,

    /// API-comparison settings
    #[serde(default)]
    pub comparison: ComparisonConfig,
}

fn default_project_name() -> String {
    "Nightly".to_string()
}

fn default_per_row() -> usize {
    4
}

fn default_executables() -> Vec<String> {
    ["java", "ant", "tar", "nice", "svn", "rm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_env_vars() -> Vec<String> {
    vec!["JAVA_HOME".to_string(), "ANT_HOME".to_string()]
}

fn default_artifact_prefix() -> String {
    "dist-svn".to_string()
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("dist/jar")
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("doc")
}

fn default_doccheck_dir() -> PathBuf {
    PathBuf::from("reports/javadoc")
}

fn default_test_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_analysis_dir() -> PathBuf {
    PathBuf::from("reports/pmd")
}

fn default_stylesheet() -> PathBuf {
    PathBuf::from("pmd/wz-pmd-report.xslt")
}

impl RunConfiguration {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, NightbuildError> {
        if !path.exists() {
            return Err(NightbuildError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| NightbuildError::read_error(path, e))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, NightbuildError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot drive a run
    fn validate(&self) -> Result<(), NightbuildError> {
        if self.per_row == 0 {
            return Err(NightbuildError::InvalidConfig {
                reason: "per_row must be at least 1".to_string(),
                help: None,
            });
        }

        if self.repo_dir.as_os_str().is_empty() {
            return Err(NightbuildError::InvalidConfig {
                reason: "repo_dir must not be empty".to_string(),
                help: Some("Point repo_dir at your version-controlled source tree".to_string()),
            });
        }

        Ok(())
    }

    /// Full path to a log file in the working directory
    pub fn log_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    /// Artifact file name for a given compact date, e.g. `dist-svn-20260829.jar`
    pub fn artifact_name(&self, compact_date: &str) -> String {
        format!("{}-{}.jar", self.artifact_prefix, compact_date)
    }

    /// Full path to the artifact the build stage produces
    pub fn artifact_path(&self, compact_date: &str) -> PathBuf {
        self.repo_dir
            .join(&self.artifact_dir)
            .join(self.artifact_name(compact_date))
    }
}

/// Command lines for each stage, run through the shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCommands {
    /// Version-control sync (exit status is the only signal)
    #[serde(default = "default_sync_command")]
    pub sync: String,

    /// Build/distribution stage
    #[serde(default = "default_build_command")]
    pub build: String,

    /// Test-suite stage
    #[serde(default = "default_test_command")]
    pub test: String,

    /// API-documentation stage
    #[serde(default = "default_docs_command")]
    pub docs: String,

    /// Documentation-check stage
    #[serde(default = "default_doccheck_command")]
    pub doccheck: String,

    /// Static-analysis stage
    #[serde(default = "default_analysis_command")]
    pub analysis: String,
}

impl Default for StageCommands {
    fn default() -> Self {
        Self {
            sync: default_sync_command(),
            build: default_build_command(),
            test: default_test_command(),
            docs: default_docs_command(),
            doccheck: default_doccheck_command(),
            analysis: default_analysis_command(),
        }
    }
}

fn default_sync_command() -> String {
    "svn update".to_string()
}

fn default_build_command() -> String {
    "nice -n 19 ant clean dist-large".to_string()
}

fn default_test_command() -> String {
    "nice -n 19 ant -DrunSlowTests=false test-all".to_string()
}

fn default_docs_command() -> String {
    "nice -n 19 ant -f javadoc.xml".to_string()
}

fn default_doccheck_command() -> String {
    "nice -n 19 ant -f javadoc.xml doccheck".to_string()
}

fn default_analysis_command() -> String {
    "nice -n 19 ant -f pmd.xml pmd".to_string()
}

/// Failure-notification settings
///
/// Mail is sent only when all three values are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host
    #[serde(default)]
    pub server: Option<String>,

    /// From address
    #[serde(default)]
    pub from: Option<String>,

    /// To address
    #[serde(default)]
    pub to: Option<String>,
}

impl MailConfig {
    /// True when server, from, and to are all configured
    pub fn is_complete(&self) -> bool {
        self.server.is_some() && self.from.is_some() && self.to.is_some()
    }
}

/// Dependency-graph generation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Classpath carrying the interpreter and graph-library jars.
    /// When unset the graph stage is skipped.
    #[serde(default)]
    pub classpath: Option<String>,
}

/// API-comparison settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Install directory of the comparison tool pair.
    /// When unset the comparison stage is skipped.
    #[serde(default)]
    pub tool_dir: Option<PathBuf>,

    /// Archive of the last stable release to compare against
    #[serde(default)]
    pub prior_artifact: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
repo_dir: /tmp/nightly/repo
work_dir: /tmp/nightly
publish_dir: /tmp/nightly/web
"#;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = RunConfiguration::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.per_row, 4);
        assert_eq!(config.required_env_vars, vec!["JAVA_HOME", "ANT_HOME"]);
        assert!(config.required_executables.contains(&"svn".to_string()));
        assert!(config.commands.sync.starts_with("svn"));
        assert!(!config.mail.is_complete());
        assert!(config.graph.classpath.is_none());
    }

    #[test]
    fn test_zero_per_row_rejected() {
        let yaml = format!("{}per_row: 0\n", MINIMAL);
        assert!(RunConfiguration::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_mail_complete_requires_all_three() {
        let yaml = format!(
            "{}mail:\n  server: smtp.example.org\n  from: nightly@example.org\n",
            MINIMAL
        );
        let config = RunConfiguration::from_yaml(&yaml).unwrap();
        assert!(!config.mail.is_complete());

        let yaml = format!(
            "{}mail:\n  server: smtp.example.org\n  from: nightly@example.org\n  to: dev@example.org\n",
            MINIMAL
        );
        let config = RunConfiguration::from_yaml(&yaml).unwrap();
        assert!(config.mail.is_complete());
    }

    #[test]
    fn test_artifact_naming() {
        let config = RunConfiguration::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.artifact_name("20260829"), "dist-svn-20260829.jar");
        assert!(config
            .artifact_path("20260829")
            .ends_with("dist/jar/dist-svn-20260829.jar"));
    }
}
