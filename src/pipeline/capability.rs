// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Optional-tool capability checks
//!
//! Best-effort stages (dependency graph, API comparison, XML transform)
//! are gated by an explicit capability result checked before the stage is
//! scheduled. An unavailable capability is a console notice and a skipped
//! stage, never a failure.

use std::path::PathBuf;

use crate::config::RunConfiguration;
use crate::probe::executable_exists;

/// Whether an optional collaborator can be used, and if not, why
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable { reason: String },
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    fn missing(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Dependency-graph rendering: needs a configured classpath carrying the
/// interpreter and graph-library jars, plus `dot` on PATH.
pub fn graph_capability(config: &RunConfiguration) -> Capability {
    let Some(classpath) = config.graph.classpath.as_deref() else {
        return Capability::missing("classpath not specified");
    };

    if !classpath.contains("bsh.jar") || !classpath.contains("jgrapht") {
        return Capability::missing("classpath lacks bsh.jar or the jgrapht jar");
    }

    if !executable_exists("dot") {
        return Capability::missing("dot not found on PATH");
    }

    Capability::Available
}

/// API comparison: needs the tool directory, a prior release artifact, and
/// a runtime archive resolvable from JAVA_HOME.
pub fn comparison_capability(config: &RunConfiguration) -> Capability {
    if config.comparison.tool_dir.is_none() {
        return Capability::missing("comparison tool_dir not specified");
    }

    if config.comparison.prior_artifact.is_none() {
        return Capability::missing("prior_artifact not specified");
    }

    let Some(java_home) = std::env::var_os("JAVA_HOME") else {
        return Capability::missing("JAVA_HOME not set");
    };

    if runtime_archive(&PathBuf::from(java_home)).is_none() {
        return Capability::missing("cannot find rt.jar under JAVA_HOME");
    }

    Capability::Available
}

/// XML-to-HTML transform: needs `xsltproc` on PATH. When unavailable the
/// publisher falls back to a byte-for-byte copy instead of skipping.
pub fn transform_capability() -> Capability {
    if executable_exists("xsltproc") {
        Capability::Available
    } else {
        Capability::missing("xsltproc not found on PATH")
    }
}

/// Locate the runtime archive under a toolchain root
pub fn runtime_archive(java_home: &std::path::Path) -> Option<PathBuf> {
    let candidates = [
        java_home.join("jre").join("lib").join("rt.jar"),
        java_home.join("lib").join("rt.jar"),
    ];
    candidates.into_iter().find(|p| p.exists())
}
