//! Markdown → HTML regeneration for the project's root documents.
//!
//! A page is regenerated when its `.html` sibling is missing or older than
//! the Markdown source. `README.md` is never converted.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use dashrun_core::paths;
use dashrun_renderer::{markdown, DocPageContext, TemplateEngine};

use crate::activity::modified_local;
use crate::error::{io_err, DocsError};
use crate::file_map;
use crate::writer::atomic_write;

const EXCLUDED: &[&str] = &["README.md"];

/// Outcome of one documentation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocsReport {
    pub files_updated: usize,
    /// Names of the regenerated `.html` files.
    pub updated_files: Vec<String>,
    /// Sources whose page was already current.
    pub skipped: Vec<String>,
    /// Sources that failed to convert; logged and left as they were.
    pub failed: Vec<String>,
}

/// Root-level `*.md` files except the excluded ones, sorted by name.
pub fn scan_markdown(root: &Path) -> Result<Vec<PathBuf>, DocsError> {
    let entries = std::fs::read_dir(root).map_err(|e| io_err(root, e))?;
    let mut found: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("md"))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !EXCLUDED.contains(&n))
        })
        .collect();
    found.sort();
    Ok(found)
}

/// `true` when the `.html` sibling is missing or strictly older than `md`.
pub fn needs_update(md: &Path) -> Result<bool, DocsError> {
    let html = md.with_extension("html");
    let html_meta = match std::fs::metadata(&html) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(err) => return Err(io_err(&html, err)),
    };
    let md_meta = std::fs::metadata(md).map_err(|e| io_err(md, e))?;
    let md_time = md_meta.modified().map_err(|e| io_err(md, e))?;
    let html_time = html_meta.modified().map_err(|e| io_err(&html, e))?;
    Ok(md_time > html_time)
}

/// Convert one Markdown file and write its page; returns the page file name.
pub fn convert_file(engine: &TemplateEngine, md: &Path) -> Result<String, DocsError> {
    let source = std::fs::read_to_string(md).map_err(|e| io_err(md, e))?;
    let stem = md
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source_name = md
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut ctx = DocPageContext::new(
        markdown::extract_title(&source, &stem),
        markdown::to_html(&source),
        &source_name,
    );
    if let Ok(meta) = std::fs::metadata(md) {
        if let Some(modified) = modified_local(&meta) {
            ctx = ctx.with_source_stats(meta.len(), modified);
        }
    }

    let html_path = md.with_extension("html");
    atomic_write(&html_path, &engine.render_doc_page(&ctx)?)?;
    let html_name = format!("{stem}.html");
    tracing::info!("updated {html_name} from {source_name}");
    Ok(html_name)
}

/// Regenerate every stale page under `root`, then refresh `file_map.json`.
///
/// Only a failure to list the project root or to load the templates fails
/// the pass; per-file and file-map problems are logged.
pub fn update_docs(root: &Path) -> Result<DocsReport, DocsError> {
    let engine = TemplateEngine::new(Some(&paths::user_templates_dir(root)))?;
    let mut report = DocsReport::default();

    for md in scan_markdown(root)? {
        let name = md
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stale = match needs_update(&md) {
            Ok(stale) => stale,
            Err(err) => {
                tracing::warn!(file = %name, error = %err, "cannot compare modification times");
                true
            }
        };
        if !stale {
            report.skipped.push(name);
            continue;
        }
        match convert_file(&engine, &md) {
            Ok(html_name) => report.updated_files.push(html_name),
            Err(err) => {
                tracing::warn!(file = %name, error = %err, "conversion failed");
                report.failed.push(name);
            }
        }
    }
    report.files_updated = report.updated_files.len();

    if let Err(err) = file_map::update_file_map(root, Local::now().date_naive()) {
        tracing::warn!(error = %err, "file map not updated");
    }

    tracing::info!(
        updated = report.files_updated,
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "documentation pass finished"
    );
    Ok(report)
}
