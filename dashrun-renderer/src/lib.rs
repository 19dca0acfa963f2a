//! # dashrun-renderer
//!
//! Markdown conversion plus the Tera templates behind the generated HTML
//! pages and conversation-log entries.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dashrun_renderer::{markdown, DocPageContext, TemplateEngine};
//!
//! fn page(source: &str) -> Option<String> {
//!     let engine = TemplateEngine::new(None).ok()?;
//!     let ctx = DocPageContext::new(
//!         markdown::extract_title(source, "notes"),
//!         markdown::to_html(source),
//!         "notes.md",
//!     );
//!     engine.render_doc_page(&ctx).ok()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod markdown;

pub use context::{DocPageContext, InitialLogContext, SessionContext};
pub use engine::{TemplateEngine, TemplateKind};
pub use error::RenderError;
