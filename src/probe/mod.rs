// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Executable and environment probe
//!
//! Checks that every required external program resolves on PATH and that
//! every required environment variable is set before any work begins.
//! A failed probe is the only condition that terminates the process with
//! a nonzero exit.

use std::collections::BTreeSet;

use crate::errors::{NightbuildError, NightbuildResult};

/// Outcome of probing the process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentReport {
    /// Required executables that did not resolve on PATH
    pub missing_execs: BTreeSet<String>,

    /// Required environment variables that are unset
    pub missing_envs: BTreeSet<String>,
}

impl EnvironmentReport {
    /// True when nothing is missing
    pub fn is_clean(&self) -> bool {
        self.missing_execs.is_empty() && self.missing_envs.is_empty()
    }

    /// Convert into the corresponding startup error. Missing executables
    /// take precedence over missing variables; a clean report is `Ok`.
    pub fn into_error(self) -> NightbuildResult<()> {
        if !self.missing_execs.is_empty() {
            return Err(NightbuildError::MissingExecutables {
                names: self.missing_execs.into_iter().collect(),
            });
        }
        if !self.missing_envs.is_empty() {
            return Err(NightbuildError::MissingEnvVars {
                names: self.missing_envs.into_iter().collect(),
            });
        }
        Ok(())
    }
}

/// Probe PATH for required executables and the environment for required
/// variables. Pure lookup; no side effects.
pub fn check_environment<S: AsRef<str>>(
    exec_names: &[S],
    env_names: &[S],
) -> EnvironmentReport {
    let mut report = EnvironmentReport::default();

    for name in exec_names {
        if which::which(name.as_ref()).is_err() {
            report.missing_execs.insert(name.as_ref().to_string());
        }
    }

    for name in env_names {
        if std::env::var_os(name.as_ref()).is_none() {
            report.missing_envs.insert(name.as_ref().to_string());
        }
    }

    report
}

/// True when a single executable resolves on PATH
pub fn executable_exists(name: &str) -> bool {
    which::which(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_executables_resolve() {
        // sh and env exist on any Unix test host
        let report = check_environment(&["sh", "env"], &["PATH"]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_executable_reported() {
        let report = check_environment(&["definitely-not-a-real-binary-xyzzy"], &[]);
        assert_eq!(report.missing_execs.len(), 1);
        assert!(report
            .missing_execs
            .contains("definitely-not-a-real-binary-xyzzy"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_missing_env_var_reported() {
        let report = check_environment::<&str>(&[], &["NIGHTBUILD_NO_SUCH_VAR_12345"]);
        assert!(report.missing_envs.contains("NIGHTBUILD_NO_SUCH_VAR_12345"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_empty_inputs_are_clean() {
        let report = check_environment::<&str>(&[], &[]);
        assert!(report.is_clean());
        assert!(report.into_error().is_ok());
    }

    #[test]
    fn test_missing_executables_become_structured_error() {
        let report = check_environment(&["definitely-not-a-real-binary-xyzzy"], &[]);
        match report.into_error() {
            Err(NightbuildError::MissingExecutables { names }) => {
                assert_eq!(names, vec!["definitely-not-a-real-binary-xyzzy"]);
            }
            other => panic!("expected MissingExecutables, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_env_vars_become_structured_error() {
        let report = check_environment::<&str>(&[], &["NIGHTBUILD_NO_SUCH_VAR_12345"]);
        match report.into_error() {
            Err(NightbuildError::MissingEnvVars { names }) => {
                assert_eq!(names, vec!["NIGHTBUILD_NO_SUCH_VAR_12345"]);
            }
            other => panic!("expected MissingEnvVars, got {other:?}"),
        }
    }
}
