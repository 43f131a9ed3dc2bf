// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Report renderer
//!
//! Pure template substitution over structured results. No I/O happens
//! here; callers persist the returned strings. Each index section is
//! driven by a discriminated [`StageOutcome`] so the failed and skipped
//! variants render through the same explicit case, never through
//! conditional string concatenation scattered across the page build.

pub mod templates;

use crate::parser::ModuleTestStat;

/// One hyperlink in a report cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }

    fn to_html(&self) -> String {
        format!("<a href=\"{}\">{}</a>", self.href, self.label)
    }
}

/// How a stage's index section renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Normal content: a link list, wrapped every N entries
    Success { links: Vec<Link> },

    /// FAILED cell, with a log link only if the log was actually copied
    Failed { log_link: Option<Link> },

    /// Never ran (upstream failure); renders like a no-log failure
    Skipped,
}

/// One section of the index page
#[derive(Debug, Clone)]
pub struct SectionRow {
    /// Left cell, may carry markup (e.g. an external reference link)
    pub title: String,

    /// Middle cell content
    pub outcome: StageOutcome,

    /// Right "Extra Info" cell links (log copies, summaries)
    pub extra: Vec<Link>,

    /// Whether a horizontal rule follows this section
    pub rule_after: bool,
}

impl SectionRow {
    pub fn new(title: impl Into<String>, outcome: StageOutcome) -> Self {
        Self {
            title: title.into(),
            outcome,
            extra: Vec::new(),
            rule_after: false,
        }
    }

    pub fn with_extra(mut self, extra: Vec<Link>) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_rule(mut self) -> Self {
        self.rule_after = true;
        self
    }
}

/// Render the nightly index page
pub fn render_index_page(
    project: &str,
    date_dashed: &str,
    rows: &[SectionRow],
    per_row: usize,
    config_href: &str,
) -> String {
    let title = format!("{project} Nightly Build - {date_dashed}");
    let mut page = templates::page_head(&title);
    page.push_str(&format!("<h2>{title}</h2>\n"));
    page.push_str(templates::INDEX_TABLE_OPEN);

    for row in rows {
        page.push_str(&render_section_row(row, per_row));
        if row.rule_after {
            page.push_str(templates::RULE_ROW);
        }
    }

    page.push_str(&templates::index_footer(config_href));
    page
}

/// Render one index section
fn render_section_row(row: &SectionRow, per_row: usize) -> String {
    let mut html = String::from("<tr>\n");
    html.push_str(&format!("<td valign=\"top\">{}</td>\n", row.title));

    match &row.outcome {
        StageOutcome::Success { links } => {
            html.push_str(&format!("<td>{}</td>\n", wrap_links(links, per_row)));
            html.push_str(&extra_cell(&row.extra));
        }
        StageOutcome::Failed { log_link } => {
            html.push_str(templates::FAILED_CELL);
            html.push('\n');
            // Degrade to the no-link variant when the log was not copied
            match log_link {
                Some(link) => html.push_str(&extra_cell(std::slice::from_ref(link))),
                None => {}
            }
        }
        StageOutcome::Skipped => {
            html.push_str(templates::FAILED_CELL);
            html.push('\n');
        }
    }

    html.push_str("</tr>\n");
    html
}

/// Right "Extra Info" cell, links separated by line breaks
fn extra_cell(links: &[Link]) -> String {
    if links.is_empty() {
        return String::new();
    }
    let body = links
        .iter()
        .map(Link::to_html)
        .collect::<Vec<_>>()
        .join("<br>\n");
    format!("<td valign=\"top\">{body}</td>\n")
}

/// Join links with a forced line break after every `per_row`-th entry,
/// bounding the visual row width.
fn wrap_links(links: &[Link], per_row: usize) -> String {
    let mut html = String::new();
    for (i, link) in links.iter().enumerate() {
        html.push_str(&link.to_html());
        if (i + 1) % per_row == 0 && i + 1 < links.len() {
            html.push_str("<br>");
        }
        html.push('\n');
    }
    html
}

/// Render the per-module test summary page
pub fn render_summary_page(
    project: &str,
    date_dashed: &str,
    stats: &[ModuleTestStat],
) -> String {
    let title = format!("{project} Test Summary - {date_dashed}");
    let mut page = templates::page_head(&title);
    page.push_str(&format!("<h2>{project} Test Summary ({date_dashed})</h2>\n"));
    page.push_str(templates::SUMMARY_TABLE_OPEN);

    for stat in stats {
        page.push_str("<tr>");
        page.push_str(&format!("<td align=\"left\">{}</td>", stat.module_name));
        page.push_str(&format!("<td align=\"center\">{}</td>", stat.tests_run));
        page.push_str(&format!("<td align=\"center\">{}</td>", stat.failed));
        page.push_str(&format!("<td align=\"center\">{}</td>", stat.errored));
        page.push_str("</tr>\n");
    }

    page.push_str(templates::SUMMARY_TABLE_CLOSE);
    page
}

/// Render the placeholder page written right after the publish-directory
/// wipe
pub fn render_placeholder_page(project: &str) -> String {
    let title = format!("{project} Nightly Build");
    let mut page = templates::page_head(&title);
    page.push_str(&format!("<h2>{title}</h2>\n"));
    page.push_str(templates::PLACEHOLDER_BODY);
    page
}

/// Insert a banner block immediately before the page heading. Pages
/// without a heading get the banner prepended.
pub fn inject_banner(html: &str, banner: &str) -> String {
    match html.find(templates::HEADING_MARKER) {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + banner.len());
            out.push_str(&html[..pos]);
            out.push_str(banner);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{banner}{html}"),
    }
}
