// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Test-log parser
//!
//! Extracts per-module test statistics from the build tool's textual test
//! log. The format is semi-structured: a `test-module` line opens a block,
//! the following line carries the module name at a fixed token position,
//! and a later `Tests run:` line carries the counts. Parsing is
//! deliberately lossy: a malformed block is omitted, never an error, so a
//! format drift upstream degrades the summary instead of killing the run.

use std::path::Path;

use crate::errors::{NightbuildError, NightbuildResult};

/// Sentinel opening one module's block in the test log
const MODULE_SENTINEL: &str = "test-module";

/// Substring marking the statistics line within a block
const STATS_SENTINEL: &str = "Tests run:";

/// Whitespace-token position of the module name on the line following the
/// block sentinel, e.g. `[echo] Performing the tests for standard`
const NAME_TOKEN: usize = 5;

/// Per-module test statistics, in first-occurrence log order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTestStat {
    pub module_name: String,
    pub tests_run: u32,
    pub failed: u32,
    pub errored: u32,
}

/// Parse a test log file into ordered per-module statistics
pub fn parse_test_log(path: &Path) -> NightbuildResult<Vec<ModuleTestStat>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| NightbuildError::read_error(path, e))?;
    Ok(parse_test_stats(&contents))
}

/// Parse test-log text into ordered per-module statistics.
///
/// Pure and idempotent; blocks that cannot be fully parsed are skipped.
pub fn parse_test_stats(log: &str) -> Vec<ModuleTestStat> {
    let mut stats = Vec::new();
    let mut lines = log.lines();

    while let Some(line) = lines.next() {
        if !line.starts_with(MODULE_SENTINEL) {
            continue;
        }

        let Some(name_line) = lines.next() else {
            break;
        };
        let Some(module_name) = name_line.split_whitespace().nth(NAME_TOKEN) else {
            continue;
        };

        // Scan forward for the stats line; hitting EOF drops the block
        let Some(stats_line) = lines.by_ref().find(|l| l.contains(STATS_SENTINEL)) else {
            break;
        };

        let tokens: Vec<&str> = stats_line.split_whitespace().collect();
        let counts = (
            numeric_token(&tokens, 3),
            numeric_token(&tokens, 5),
            numeric_token(&tokens, 7),
        );

        if let (Some(tests_run), Some(failed), Some(errored)) = counts {
            stats.push(ModuleTestStat {
                module_name: module_name.to_string(),
                tests_run,
                failed,
                errored,
            });
        }
    }

    stats
}

/// Parse the token at `index`, tolerating trailing punctuation
fn numeric_token(tokens: &[&str], index: usize) -> Option<u32> {
    tokens
        .get(index)
        .and_then(|t| t.trim_end_matches([',', ':', ';', '.']).parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_block(name: &str, run: u32, failed: u32, errored: u32) -> String {
        format!(
            "test-module:\n\
             \x20    [echo] Performing the tests for {name}\n\
             \x20    [junit] Running org.example.{name}.ModuleTests\n\
             \x20    [junit] Tests run: {run}, Failures: {failed}, Errors: {errored}, Time elapsed: 1.2 sec\n"
        )
    }

    #[test]
    fn test_single_module() {
        let log = module_block("core", 120, 2, 1);
        let stats = parse_test_stats(&log);
        assert_eq!(
            stats,
            vec![ModuleTestStat {
                module_name: "core".to_string(),
                tests_run: 120,
                failed: 2,
                errored: 1,
            }]
        );
    }

    #[test]
    fn test_three_modules_in_log_order() {
        let log = format!(
            "{}{}{}",
            module_block("core", 10, 0, 0),
            module_block("data", 20, 1, 0),
            module_block("io", 30, 0, 2),
        );
        let stats = parse_test_stats(&log);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].module_name, "core");
        assert_eq!(stats[1].module_name, "data");
        assert_eq!(stats[2].module_name, "io");
        assert_eq!(stats[1].failed, 1);
        assert_eq!(stats[2].errored, 2);
    }

    #[test]
    fn test_trailing_punctuation_tolerated() {
        let log = "test-module:\n\
                   \x20 [echo] Performing the tests for data\n\
                   \x20 [junit] Tests run: 42, Failures: 1, Errors: 0,\n";
        let stats = parse_test_stats(log);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].tests_run, 42);
        assert_eq!(stats[0].failed, 1);
        assert_eq!(stats[0].errored, 0);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let log = format!(
            "{}{}",
            module_block("core", 10, 0, 0),
            module_block("data", 20, 1, 0),
        );
        assert_eq!(parse_test_stats(&log), parse_test_stats(&log));
    }

    #[test]
    fn test_malformed_block_is_omitted() {
        // Second block has a short name line; third is intact
        let log = format!(
            "{}test-module:\n\x20 [echo] short\n\
             \x20 [junit] Tests run: 5, Failures: 0, Errors: 0\n{}",
            module_block("core", 10, 0, 0),
            module_block("io", 30, 0, 2),
        );
        let stats = parse_test_stats(&log);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].module_name, "core");
        assert_eq!(stats[1].module_name, "io");
    }

    #[test]
    fn test_block_without_stats_line_is_dropped() {
        let log = "test-module:\n\x20 [echo] Performing the tests for core\nno stats here\n";
        assert!(parse_test_stats(log).is_empty());
    }

    #[test]
    fn test_non_numeric_counts_are_dropped() {
        let log = "test-module:\n\
                   \x20 [echo] Performing the tests for core\n\
                   \x20 [junit] Tests run: many, Failures: 0, Errors: 0\n";
        assert!(parse_test_stats(log).is_empty());
    }

    #[test]
    fn test_empty_log() {
        assert!(parse_test_stats("").is_empty());
    }
}
