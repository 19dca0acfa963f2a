//! # dashrun-docs
//!
//! The two local maintenance jobs behind the dashboard buttons:
//!
//! - [`docs::update_docs`] regenerates HTML pages from root Markdown files
//!   and refreshes `file_map.json`;
//! - [`conversations::ConversationUpdater`] turns activity since the last
//!   run into a new session entry in `conversation_log.md`.

pub mod activity;
pub mod conversations;
pub mod docs;
pub mod error;
pub mod file_map;
mod writer;

pub use conversations::{ConversationReport, ConversationUpdater};
pub use docs::{update_docs, DocsReport};
pub use error::DocsError;
