// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! # nightbuild - Nightly Build Orchestrator
//!
//! `nightbuild` drives a nightly continuous-integration run: it syncs a
//! source tree from version control, invokes the build tool to compile,
//! test, and analyze the project, and publishes a static HTML report,
//! optionally notifying failures by email.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the full nightly pipeline
//! nightbuild
//!
//! # Rebuild the report from a previous run's logs
//! nightbuild dryrun
//!
//! # Suppress failure mail
//! nightbuild nomail
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod probe;
pub mod publish;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use config::RunConfiguration;
pub use errors::{NightbuildError, NightbuildResult};
pub use pipeline::{PipelineController, PipelineState, RunOutcome};
pub use runner::{StepResult, SUCCESS_SENTINEL};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
