//! Persistence for the GitHub config record.
//!
//! # Storage layout
//!
//! ```text
//! <project root>/
//!   automation/
//!     github_config.json   (mode 0600, written on repository creation)
//! ```
//!
//! # API pattern
//!
//! Callers depend on the [`ConfigStore`] trait. [`FileConfigStore`] is the
//! production store; [`MemoryConfigStore`] backs tests that must not touch the
//! filesystem.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::{self, DeserializeOwned, Unexpected};
use serde::Serialize;
use serde_json::Value;

use crate::error::{io_err, ConfigError};
use crate::paths;
use crate::types::GitHubConfig;

/// Load/save access to the persisted [`GitHubConfig`].
pub trait ConfigStore {
    /// `Ok(None)` when no record has been written yet.
    fn load(&self) -> Result<Option<GitHubConfig>, ConfigError>;
    fn save(&self, config: &GitHubConfig) -> Result<(), ConfigError>;
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// JSON file store, `<root>/automation/github_config.json` by default.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard location under `root`.
    pub fn for_project(root: &Path) -> Self {
        Self::new(paths::github_config_path(root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Option<GitHubConfig>, ConfigError> {
        load_json_at(&self.path)
    }

    fn save(&self, config: &GitHubConfig) -> Result<(), ConfigError> {
        save_json_at(&self.path, config)?;
        set_file_permissions(&self.path)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store holding the record in memory.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    record: Mutex<Option<GitHubConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GitHubConfig) -> Self {
        Self {
            record: Mutex::new(Some(config)),
        }
    }

    /// Snapshot of the current record.
    pub fn current(&self) -> Option<GitHubConfig> {
        self.record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<Option<GitHubConfig>, ConfigError> {
        Ok(self.current())
    }

    fn save(&self, config: &GitHubConfig) -> Result<(), ConfigError> {
        let mut guard = self
            .record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(config.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Token resolution
// ---------------------------------------------------------------------------

/// Resolve the access token: the stored record wins when it is readable and
/// carries a non-empty token, otherwise the environment variable `env_var`.
pub fn resolve_token(store: &dyn ConfigStore, env_var: &str) -> Option<String> {
    match store.load() {
        Ok(Some(config)) => {
            if let Some(token) = config.token() {
                return Some(token.to_string());
            }
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable GitHub config");
        }
    }
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// JSON document helpers
// ---------------------------------------------------------------------------

/// Read and decode a JSON object document; `Ok(None)` if the file does not
/// exist.
///
/// Derived struct decoders also accept a JSON array filled by position, so
/// anything other than an object at the top level is rejected first.
pub fn load_json_at<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let parse_err = |source: serde_json::Error| ConfigError::ParseJson {
        path: path.to_path_buf(),
        source,
    };
    let value: Value = serde_json::from_str(&contents).map_err(parse_err)?;
    if !value.is_object() {
        return Err(parse_err(de::Error::invalid_type(
            unexpected(&value),
            &"a JSON object",
        )));
    }
    serde_json::from_value(value).map(Some).map_err(parse_err)
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Atomically write a pretty JSON document.
///
/// Write flow: serialize → `<name>.tmp` sibling → `rename`. The parent
/// directory is created when missing.
pub fn save_json_at<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid document path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_sibling(path);
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.tmp"))
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
