// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! CLI definition
//!
//! One command, configured by a YAML file, with the historical mode
//! tokens kept as trailing free arguments: `help`, `dryrun`/`dry`, and
//! `nomail`, case-insensitive and order-independent. Unrecognized tokens
//! are ignored.

use clap::Parser;
use std::path::PathBuf;

/// Nightly build orchestrator
///
/// Sync the source tree, drive the build tool through its stages, and
/// publish a static HTML report.
#[derive(Parser, Debug)]
#[clap(
    name = "nightbuild",
    version,
    about = "Nightly build orchestrator: sync, build, test, and publish a static report",
    long_about = None,
    after_help = "Examples:\n\
        nightbuild                      Run the full nightly pipeline\n\
        nightbuild dryrun               Rebuild the report from prior logs\n\
        nightbuild nomail               Run without failure notification\n\
        nightbuild dry nomail           Tokens combine in any order"
)]
pub struct Cli {
    /// Configuration file
    #[clap(short, long, default_value = "nightbuild.yaml", value_name = "FILE")]
    pub config: PathBuf,

    /// Change to directory before executing
    #[clap(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Enable verbose output
    #[clap(short, long)]
    pub verbose: bool,

    /// Mode tokens: help, dryrun/dry, nomail
    #[clap(value_name = "TOKEN")]
    pub tokens: Vec<String>,
}

/// Usage text for the `help` token (exit 0)
pub const USAGE: &str = "Usage: nightbuild [OPTIONS] [TOKEN]...

TOKEN can be:

  help   - this message
  dryrun - do a dry run. This does not sync with version control or run
           build stages. It is expected that you have logs from a previous
           run available and is mainly for exercising the report
  nomail - if specified no mail will be sent in response to build errors
";

/// Run modes decoded from the trailing tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub help: bool,
    pub dry_run: bool,
    pub no_mail: bool,
}

impl RunOptions {
    /// Decode tokens case-insensitively, in any order, ignoring anything
    /// unrecognized.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut options = Self::default();
        for token in tokens {
            match token.as_ref().to_lowercase().as_str() {
                "help" => options.help = true,
                "dryrun" | "dry" => options.dry_run = true,
                "nomail" => options.no_mail = true,
                _ => {}
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_case_insensitive_any_order() {
        let options = RunOptions::from_tokens(&["NOMAIL", "DryRun"]);
        assert!(options.dry_run);
        assert!(options.no_mail);
        assert!(!options.help);
    }

    #[test]
    fn test_dry_alias() {
        assert!(RunOptions::from_tokens(&["dry"]).dry_run);
    }

    #[test]
    fn test_unrecognized_tokens_ignored() {
        let options = RunOptions::from_tokens(&["frobnicate", "--weird"]);
        assert_eq!(options, RunOptions::default());
    }

    #[test]
    fn test_help_token() {
        assert!(RunOptions::from_tokens(&["anything", "Help"]).help);
    }
}
