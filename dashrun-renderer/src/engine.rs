//! Tera rendering engine: [`TemplateKind`] and [`TemplateEngine`].
//!
//! # Template names
//!
//! | Kind              | Template                        | Output                          |
//! |-------------------|---------------------------------|---------------------------------|
//! | `DocPage`         | `pages/doc_page.html.tera`      | `<stem>.html` next to the source |
//! | `Session`         | `log/session.md.tera`           | block inside `conversation_log.md` |
//! | `ConversationLog` | `log/conversation_log.md.tera`  | fresh `conversation_log.md`     |
//!
//! Files under `automation/templates/` with the same relative name replace the
//! embedded copies.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::{DocPageContext, InitialLogContext, SessionContext};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (
        "shared/_quick_access.tera",
        include_str!("templates/_partials/quick_access.tera"),
    ),
    ("pages/doc_page.html.tera", include_str!("templates/doc_page.html.tera")),
    ("log/session.md.tera", include_str!("templates/session.md.tera")),
    (
        "log/conversation_log.md.tera",
        include_str!("templates/conversation_log.md.tera"),
    ),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((normalize_template_name(rel), contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(normalize_template_name(Path::new(name)), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// The documents this crate renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    DocPage,
    Session,
    ConversationLog,
}

impl TemplateKind {
    pub fn all() -> &'static [TemplateKind] {
        &[
            TemplateKind::DocPage,
            TemplateKind::Session,
            TemplateKind::ConversationLog,
        ]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            TemplateKind::DocPage => "pages/doc_page.html.tera",
            TemplateKind::Session => "log/session.md.tera",
            TemplateKind::ConversationLog => "log/conversation_log.md.tera",
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine holding the embedded templates plus optional user
/// overrides.
///
/// Build once and reuse; rendering borrows the engine immutably.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load embedded templates plus any `.tera` overrides found in
    /// `user_template_dir`. A missing directory is not an error.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(TemplateEngine {
            tera: build_tera(user_template_dir)?,
        })
    }

    pub fn render(&self, kind: TemplateKind, ctx: &tera::Context) -> Result<String, RenderError> {
        Ok(self.tera.render(kind.template_name(), ctx)?)
    }

    pub fn render_doc_page(&self, ctx: &DocPageContext) -> Result<String, RenderError> {
        self.render(TemplateKind::DocPage, &ctx.to_tera_context()?)
    }

    pub fn render_session(&self, ctx: &SessionContext) -> Result<String, RenderError> {
        self.render(TemplateKind::Session, &ctx.to_tera_context()?)
    }

    pub fn render_initial_log(&self, ctx: &InitialLogContext) -> Result<String, RenderError> {
        self.render(TemplateKind::ConversationLog, &ctx.to_tera_context()?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
