// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Publish-directory management
//!
//! Owns the externally served directory: wipes and rebuilds it once per
//! run, writes the placeholder page immediately after the wipe so outside
//! readers never observe a missing page, and copies every artifact the
//! report links to. A link is only ever handed to the renderer after the
//! file behind it was copied, so the page cannot carry broken internal
//! hrefs.

use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::RunConfiguration;
use crate::errors::{NightbuildError, NightbuildResult};
use crate::pipeline::capability::{runtime_archive, transform_capability};
use crate::report::{self, Link};
use crate::runner::CommandRunner;

/// Name of the self-referential configuration copy in the publish tree
pub const CONFIG_COPY_NAME: &str = "nightbuild.yaml";

/// Publishes artifacts and pages into the web-served directory
pub struct Publisher<'a> {
    config: &'a RunConfiguration,
    runner: &'a dyn CommandRunner,
}

impl<'a> Publisher<'a> {
    pub fn new(config: &'a RunConfiguration, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    fn publish_path(&self, name: &str) -> PathBuf {
        self.config.publish_dir.join(name)
    }

    /// Make sure the publish directory exists. The early-exit paths write
    /// into it without the full wipe.
    pub fn ensure_dir(&self) -> NightbuildResult<()> {
        std::fs::create_dir_all(&self.config.publish_dir).map_err(|e| {
            NightbuildError::PublishError {
                path: self.config.publish_dir.clone(),
                error: e.to_string(),
            }
        })
    }

    /// Wipe the publish directory and immediately write the placeholder
    /// page. The "placeholder then replace" sequencing protects external
    /// HTTP readers during regeneration.
    pub fn wipe_and_hold(&self) -> NightbuildResult<()> {
        let dir = &self.config.publish_dir;

        if dir.exists() {
            std::fs::remove_dir_all(dir).map_err(|e| NightbuildError::PublishError {
                path: dir.clone(),
                error: e.to_string(),
            })?;
        }
        self.ensure_dir()?;

        let placeholder = report::render_placeholder_page(&self.config.project_name);
        self.write_index(&placeholder)
    }

    /// Write the final index page
    pub fn write_index(&self, html: &str) -> NightbuildResult<()> {
        let path = self.publish_path("index.html");
        std::fs::write(&path, html).map_err(|e| NightbuildError::write_error(&path, e))
    }

    /// Annotate the previously published index page with a banner. Used
    /// by the sync-failure early-exit path, which reuses yesterday's page
    /// instead of regenerating. A first run with no previous page falls
    /// back to annotating the placeholder.
    pub fn annotate_previous(&self, banner: &str) -> NightbuildResult<()> {
        self.ensure_dir()?;
        let path = self.publish_path("index.html");
        let existing = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| report::render_placeholder_page(&self.config.project_name));
        let annotated = report::inject_banner(&existing, banner);
        std::fs::write(&path, annotated).map_err(|e| NightbuildError::write_error(&path, e))
    }

    /// Copy a per-stage log from the working directory, returning a link
    /// only when the source exists. Absent logs degrade the section to the
    /// no-link failure variant.
    pub fn copy_log(&self, name: &str) -> Option<Link> {
        let src = self.config.log_path(name);
        if !src.exists() {
            return None;
        }
        let dest = self.publish_path(name);
        match std::fs::copy(&src, &dest) {
            Ok(_) => Some(Link::new(name, name)),
            Err(e) => {
                warn!("could not copy {}: {}", src.display(), e);
                None
            }
        }
    }

    /// Copy the build log under a failure-marked name for the minimal
    /// failure page.
    pub fn copy_failed_build_log(&self) -> Option<Link> {
        let src = self.config.log_path("build.log");
        let dest = self.publish_path("build.log.fail");
        match std::fs::copy(&src, &dest) {
            Ok(_) => Some(Link::new("build.log", "build.log.fail")),
            Err(e) => {
                warn!("could not copy build log: {}", e);
                None
            }
        }
    }

    /// Copy the distributable artifact produced by the build stage
    pub fn copy_artifact(&self, compact_date: &str) -> Option<Link> {
        let name = self.config.artifact_name(compact_date);
        let src = self.config.artifact_path(compact_date);
        let dest = self.publish_path(&name);
        match std::fs::copy(&src, &dest) {
            Ok(_) => Some(Link::new(&name, &name)),
            Err(e) => {
                warn!("could not copy artifact {}: {}", src.display(), e);
                None
            }
        }
    }

    /// Archive the generated docs tree as `javadoc-<date>.tgz` via the
    /// probed `tar` executable, and copy it browsable under `api/`.
    /// Returns (archive link, browse link).
    pub async fn publish_docs(&self, compact_date: &str) -> (Option<Link>, Option<Link>) {
        let docs_root = self.config.repo_dir.join(&self.config.docs_dir);
        let api_dir = docs_root.join("api");
        if !api_dir.is_dir() {
            warn!("docs tree {} missing, nothing to publish", api_dir.display());
            return (None, None);
        }

        let archive_name = format!("javadoc-{compact_date}.tgz");
        let archive_path = self.publish_path(&archive_name);
        let command = format!(
            "tar -czf '{}' -C '{}' api",
            archive_path.display(),
            docs_root.display()
        );
        let archived = self
            .runner
            .run_for_status(&command, &self.config.log_path("archive.log"))
            .await;
        let archive_link = if archived && archive_path.exists() {
            Some(Link::new("Tarball", &archive_name))
        } else {
            warn!("docs archive failed");
            None
        };

        let browse_link = match copy_tree(&api_dir, &self.publish_path("api")) {
            Ok(()) => Some(Link::new("Browse online", "api")),
            Err(e) => {
                warn!("could not copy docs tree: {}", e);
                None
            }
        };

        (archive_link, browse_link)
    }

    /// Copy per-module test result files into `test/` and return links in
    /// sorted order, labeled by module name (`result-<module>.txt`).
    pub fn copy_test_reports(&self) -> NightbuildResult<Vec<Link>> {
        let test_dir = self.publish_path("test");
        std::fs::create_dir_all(&test_dir)
            .map_err(|e| NightbuildError::write_error(&test_dir, e))?;

        let pattern = self
            .config
            .repo_dir
            .join(&self.config.test_reports_dir)
            .join("result-*");
        let mut reports: Vec<PathBuf> = glob(&pattern.to_string_lossy())?
            .filter_map(Result::ok)
            .collect();
        reports.sort();

        let mut links = Vec::new();
        for report in &reports {
            let Some(file_name) = report.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let dest = test_dir.join(file_name);
            std::fs::copy(report, &dest).map_err(|e| NightbuildError::FileCopyError {
                from: report.clone(),
                to: dest,
                error: e.to_string(),
            })?;

            // result-data.txt -> "data"; only the text reports get a link
            if file_name.ends_with(".txt") {
                let stem = file_name.trim_end_matches(".txt");
                let module = stem.split('-').nth(1).unwrap_or(stem);
                links.push(Link::new(module, format!("test/{file_name}")));
            }
        }

        Ok(links)
    }

    /// Write the parsed per-module summary as `junitsummary.html`
    pub fn write_summary(
        &self,
        stats: &[crate::parser::ModuleTestStat],
        date_dashed: &str,
    ) -> NightbuildResult<Link> {
        let html = report::render_summary_page(&self.config.project_name, date_dashed, stats);
        let path = self.publish_path("junitsummary.html");
        std::fs::write(&path, html).map_err(|e| NightbuildError::write_error(&path, e))?;
        Ok(Link::new("Summary", "junitsummary.html"))
    }

    /// Copy the doccheck report tree under `javadoc/` and return one link
    /// per module subdirectory, sorted.
    pub fn copy_doccheck_tree(&self) -> NightbuildResult<Vec<Link>> {
        let src = self.config.repo_dir.join(&self.config.doccheck_dir);
        if !src.is_dir() {
            return Ok(Vec::new());
        }
        let dest = self.publish_path("javadoc");
        copy_tree(&src, &dest)?;

        let mut subdirs: Vec<String> = std::fs::read_dir(&src)
            .map_err(|e| NightbuildError::read_error(&src, e))?
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        subdirs.sort();

        Ok(subdirs
            .into_iter()
            .map(|dir| Link::new(&dir, format!("javadoc/{dir}")))
            .collect())
    }

    /// Transform analysis XML reports to HTML under `analysis/`, falling
    /// back to a byte-for-byte copy when the transform tool is
    /// unavailable or fails.
    pub async fn transform_analysis_reports(&self) -> NightbuildResult<Vec<Link>> {
        let out_dir = self.publish_path("analysis");
        std::fs::create_dir_all(&out_dir)
            .map_err(|e| NightbuildError::write_error(&out_dir, e))?;

        let pattern = self
            .config
            .repo_dir
            .join(&self.config.analysis_dir)
            .join("*.xml");
        let mut reports: Vec<PathBuf> = glob(&pattern.to_string_lossy())?
            .filter_map(Result::ok)
            .collect();
        reports.sort();

        let stylesheet = self.config.repo_dir.join(&self.config.analysis_stylesheet);
        let can_transform = transform_capability().is_available() && stylesheet.exists();
        if !can_transform {
            debug!("transform tool unavailable, copying analysis XML as-is");
        }

        let mut links = Vec::new();
        for xml in &reports {
            let Some(stem) = xml.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let dest = out_dir.join(format!("{stem}.html"));

            let mut transformed = false;
            if can_transform {
                let command = format!(
                    "xsltproc -o '{}' '{}' '{}'",
                    dest.display(),
                    stylesheet.display(),
                    xml.display()
                );
                transformed = self
                    .runner
                    .run_for_status(&command, &self.config.log_path("transform.log"))
                    .await
                    && dest.exists();
            }

            if !transformed {
                std::fs::copy(xml, &dest).map_err(|e| NightbuildError::FileCopyError {
                    from: xml.clone(),
                    to: dest.clone(),
                    error: e.to_string(),
                })?;
            }

            links.push(Link::new(stem, format!("analysis/{stem}.html")));
        }

        Ok(links)
    }

    /// Render the dependency graph as PNG and PS images. Caller has
    /// already verified the capability; any tool failure just drops the
    /// section.
    pub async fn generate_dependency_graph(&self) -> Option<Vec<Link>> {
        let classpath = self.config.graph.classpath.as_deref()?;
        let dot_file = self.config.log_path("depgraph.dot");

        // stdout of the interpreter is the graph description
        let command = format!("java -cp {classpath} bsh.Interpreter deptodot.bsh 2>/dev/null");
        if !self.runner.run_for_status(&command, &dot_file).await {
            warn!("graph description generation failed");
            return None;
        }

        let png = self.publish_path("depgraph.png");
        let ps = self.publish_path("depgraph.ps");
        let png_ok = self
            .runner
            .run_for_status(
                &format!("dot -Tpng '{}' -o '{}'", dot_file.display(), png.display()),
                &self.config.log_path("dot.log"),
            )
            .await;
        let ps_ok = self
            .runner
            .run_for_status(
                &format!("dot -Tps '{}' -o '{}'", dot_file.display(), ps.display()),
                &self.config.log_path("dot.log"),
            )
            .await;

        let _ = std::fs::remove_file(&dot_file);

        if png_ok && ps_ok {
            Some(vec![
                Link::new("PNG", "depgraph.png"),
                Link::new("PS", "depgraph.ps"),
            ])
        } else {
            warn!("dot rendering failed");
            None
        }
    }

    /// Run the API-comparison tool pair against the prior release and
    /// publish the comparison page, its stylesheet, and the tool log.
    /// Caller has already verified the capability.
    pub async fn run_api_comparison(&self, compact_date: &str) -> Option<Vec<Link>> {
        let tool_dir = self.config.comparison.tool_dir.as_ref()?;
        let prior = self.config.comparison.prior_artifact.as_ref()?;
        let java_home = PathBuf::from(std::env::var_os("JAVA_HOME")?);
        let rt_jar = runtime_archive(&java_home)?;

        let japize = tool_dir.join("bin").join("japize");
        let japicompat = tool_dir.join("bin").join("japicompat");

        let old_name = prior
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("prior");
        let old_api = self.config.log_path(&format!("{old_name}.japi.gz"));
        let new_api = self
            .config
            .log_path(&format!("{}.japi.gz", self.config.artifact_name(compact_date)));
        let new_jar = self.config.artifact_path(compact_date);

        // one log per digest so the second invocation cannot clobber the
        // first's diagnostics
        let old_ok = self
            .runner
            .run_for_status(
                &format!(
                    "'{}' as '{}' apis '{}' '{}' +org 2>&1",
                    japize.display(),
                    old_api.display(),
                    prior.display(),
                    rt_jar.display()
                ),
                &self.config.log_path("japize-old.log"),
            )
            .await;
        let new_ok = self
            .runner
            .run_for_status(
                &format!(
                    "'{}' as '{}' apis '{}' '{}' +org 2>&1",
                    japize.display(),
                    new_api.display(),
                    new_jar.display(),
                    rt_jar.display()
                ),
                &self.config.log_path("japize-new.log"),
            )
            .await;
        if !(old_ok && new_ok) {
            warn!("api digest generation failed");
            return None;
        }

        let comp_html = self.config.log_path("apicomp.html");
        let comp_log = self.config.log_path("japi.log");
        let comp_ok = self
            .runner
            .run_for_status(
                &format!(
                    "'{}' -vh -o '{}' '{}' '{}' 2>&1",
                    japicompat.display(),
                    comp_html.display(),
                    old_api.display(),
                    new_api.display()
                ),
                &comp_log,
            )
            .await;
        if !comp_ok || !comp_html.exists() {
            warn!("api comparison failed");
            return None;
        }

        // publish the page, its stylesheet, and the comparison log
        std::fs::copy(&comp_html, self.publish_path("apicomp.html")).ok()?;
        let css = tool_dir.join("design").join("japi.css");
        if let Err(e) = std::fs::copy(&css, self.publish_path("japi.css")) {
            debug!("no comparison stylesheet: {}", e);
        }
        let log_link = std::fs::copy(&comp_log, self.publish_path("japi.log"))
            .ok()
            .map(|_| Link::new("japicompat.log", "japi.log"));

        // digests are temporaries
        let _ = std::fs::remove_file(&old_api);
        let _ = std::fs::remove_file(&new_api);
        let _ = std::fs::remove_file(&comp_html);

        let mut links = vec![Link::new("Summary", "apicomp.html")];
        links.extend(log_link);
        Some(links)
    }

    /// Copy the orchestrator's own configuration into the publish tree
    /// (the report footer links to it).
    pub fn copy_config(&self, config_path: &Path) -> Option<Link> {
        match std::fs::copy(config_path, self.publish_path(CONFIG_COPY_NAME)) {
            Ok(_) => Some(Link::new(CONFIG_COPY_NAME, CONFIG_COPY_NAME)),
            Err(e) => {
                debug!("could not copy configuration: {}", e);
                None
            }
        }
    }

    /// Remove stale stage logs from the working directory before a fresh
    /// (non-dry) run.
    pub fn clear_stale_logs(&self) -> NightbuildResult<()> {
        let pattern = self.config.work_dir.join("*.log");
        for entry in glob(&pattern.to_string_lossy())?.filter_map(Result::ok) {
            std::fs::remove_file(&entry)
                .map_err(|e| NightbuildError::write_error(&entry, e))?;
        }
        Ok(())
    }
}

/// Recursively copy a directory tree
fn copy_tree(src: &Path, dest: &Path) -> NightbuildResult<()> {
    std::fs::create_dir_all(dest).map_err(|e| NightbuildError::write_error(dest, e))?;

    for entry in std::fs::read_dir(src).map_err(|e| NightbuildError::read_error(src, e))? {
        let entry = entry.map_err(|e| NightbuildError::read_error(src, e))?;
        let target = dest.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| NightbuildError::FileCopyError {
                from: entry.path(),
                to: target,
                error: e.to_string(),
            })?;
        }
    }

    Ok(())
}
