// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Error types for the nightly orchestrator
//!
//! Only startup problems (missing executables, missing environment
//! variables, unreadable configuration) are allowed to terminate the
//! process. Everything after the probe passes is absorbed into report
//! content or a console message.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for nightbuild operations
pub type NightbuildResult<T> = Result<T, NightbuildError>;

/// Main error type for nightbuild
#[derive(Error, Debug, Diagnostic)]
pub enum NightbuildError {
    // ─────────────────────────────────────────────────────────────────────────
    // Startup Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Missing required executables: {}", names.join(", "))]
    #[diagnostic(
        code(nightbuild::missing_executables),
        help("Install the listed tools and ensure they are on your PATH")
    )]
    MissingExecutables { names: Vec<String> },

    #[error("Missing required environment variables: {}", names.join(", "))]
    #[diagnostic(
        code(nightbuild::missing_env_vars),
        help("Export the listed variables before starting a run")
    )]
    MissingEnvVars { names: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(nightbuild::config_not_found),
        help("Create a nightbuild.yaml or pass --config <FILE>")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(nightbuild::invalid_config))]
    InvalidConfig {
        reason: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(nightbuild::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(nightbuild::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("Failed to copy '{from}' to '{to}': {error}")]
    #[diagnostic(code(nightbuild::file_copy_error))]
    FileCopyError {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Publish Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to rebuild publish directory '{path}': {error}")]
    #[diagnostic(
        code(nightbuild::publish_error),
        help("Check that the publish directory exists and is writable")
    )]
    PublishError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(nightbuild::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(nightbuild::yaml_error))]
    Yaml { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(nightbuild::glob_error))]
    GlobPattern { message: String },
}

impl From<std::io::Error> for NightbuildError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for NightbuildError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<glob::PatternError> for NightbuildError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl NightbuildError {
    /// Wrap a read failure with the offending path
    pub fn read_error(path: &std::path::Path, e: std::io::Error) -> Self {
        Self::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        }
    }

    /// Wrap a write failure with the offending path
    pub fn write_error(path: &std::path::Path, e: std::io::Error) -> Self {
        Self::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        }
    }
}
