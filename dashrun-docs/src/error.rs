//! Error types for dashrun-docs.

use std::path::PathBuf;

use thiserror::Error;

use dashrun_core::ConfigError;
use dashrun_renderer::RenderError;

/// All errors that can arise from the documentation and conversation updaters.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Reading or writing a document under `automation/`.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `file_map.json` exists but lacks a section the updater writes to.
    #[error("{path} has no '{section}' object")]
    FileMapShape { path: PathBuf, section: &'static str },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DocsError {
    DocsError::Io {
        path: path.into(),
        source,
    }
}
