//! dashrun core library — domain types, project paths, settings, config store.
//!
//! Public API surface:
//! - [`types`] — the GitHub config record, the conversation marker, activities
//! - [`paths`] — project-relative file layout
//! - [`settings`] — optional `automation/dashrun.yaml`
//! - [`config_store`] — [`ConfigStore`] trait plus file and in-memory stores
//! - [`error`] — [`ConfigError`]

pub mod config_store;
pub mod error;
pub mod paths;
pub mod settings;
pub mod types;

pub use config_store::{resolve_token, ConfigStore, FileConfigStore, MemoryConfigStore};
pub use error::ConfigError;
pub use settings::Settings;
pub use types::{Activity, ActivityKind, GitHubConfig, Identity, LastUpdateMarker, RepoName};
