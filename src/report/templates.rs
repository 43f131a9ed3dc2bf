// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Fixed HTML template fragments
//!
//! All report pages are assembled from these fragments by pure functions
//! in the parent module. Placeholders are filled with `format!`.

/// Marker the banner-injection paths anchor on. Both the sync-failure and
/// build-failure annotations insert their block immediately before the
/// page heading.
pub const HEADING_MARKER: &str = "<h2>";

/// Page head shared by the index and placeholder pages.
/// `{0}` = title text.
pub fn page_head(title: &str) -> String {
    format!(
        "<html>\n\
         <head>\n\
         <title>{title}</title>\n\
         <style>\n\
         <!--\n\
           tr:hover {{ background-color: #efefef; }}\n\
         //-->\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <center>\n"
    )
}

/// Opening of the index results table, including the column headers
pub const INDEX_TABLE_OPEN: &str = "<table border=0 cellspacing=5>\n\
    <thead>\n\
    <tr>\n\
    <th></th>\n\
    <th></th>\n\
    <th>Extra Info</th>\n\
    </tr>\n\
    </thead>\n";

/// Horizontal rule spanning the three index columns
pub const RULE_ROW: &str = "<tr><td colspan=3><hr></td></tr>\n";

/// Visually distinct cell for a failed or skipped stage
pub const FAILED_CELL: &str = "<td bgcolor=\"#ea3f3f\"><b>FAILED</b></td>";

/// Index page footer. `config_href` points at the self-referential copy of
/// the orchestrator configuration in the publish directory.
pub fn index_footer(config_href: &str) -> String {
    format!(
        "</table>\n\
         <br><br><br>Generated by <a href=\"{config_href}\">nightbuild</a>\n\
         </center>\n\
         </body>\n\
         </html>\n"
    )
}

/// Placeholder body shown between the publish-directory wipe and the
/// final page write, so external readers never see a missing page.
pub const PLACEHOLDER_BODY: &str = "<p>\n\
    <br><br>\n\
    Regenerating Build - Please come back in a while\n\
    </center>\n\
    </body>\n\
    </html>\n";

/// Banner injected into yesterday's page when version control is
/// unreachable.
pub const SYNC_FAILURE_BANNER: &str =
    "<center><b><h3>Could not sync with version control. Using the previous build</h3></b></center>\n\
     <hr>\n\
     <p>\n";

/// Banner injected into yesterday's page when the build stage failed.
/// `{0}` = href of the copied build log.
pub fn build_failure_banner(log_href: &str) -> String {
    format!(
        "<center><b><h3>Could not compile the sources - \
         <a href=\"{log_href}\">build.log</a></h3></b></center>\n\
         <hr>\n\
         <p>\n"
    )
}

/// Opening of the test-summary table
pub const SUMMARY_TABLE_OPEN: &str = "<table border=0 cellspacing=5>\n\
    <thead>\n\
    <tr>\n\
    <td><b>Module</b></td><td><b>Number of Tests</b></td><td><b>Failed</b></td><td><b>Errors</b></td>\n\
    </tr>\n\
    </thead>\n\
    <tr>\n\
    <td colspan=4><hr></td>\n\
    </tr>\n";

/// Closing of the test-summary table
pub const SUMMARY_TABLE_CLOSE: &str = "<tr>\n\
    <td colspan=4><hr></td>\n\
    </tr>\n\
    </table>\n\
    </center>\n\
    </body>\n\
    </html>\n";
