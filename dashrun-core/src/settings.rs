//! Optional project settings at `automation/dashrun.yaml`.
//!
//! Every field has a default, so a missing file, an empty file, or a file that
//! sets a single key are all valid:
//!
//! ```yaml
//! server:
//!   port: 9090
//! github:
//!   repo_name: my-analysis
//!   private: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::paths;
use crate::types::{Identity, RepoName};

/// Root of `dashrun.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub github: GitHubSettings,
    pub identity: Identity,
    pub conversations: ConversationSettings,
}

/// Where the dashboard endpoint listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Remote repository creation and push parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub repo_name: RepoName,
    pub description: String,
    pub private: bool,
    pub api_base: String,
    /// Upper bound for the repository-creation request.
    pub timeout_secs: u64,
    pub primary_branch: String,
    pub fallback_branch: String,
    /// Environment variable consulted when the config record has no token.
    pub token_env: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            repo_name: RepoName::from("trading-project-002"),
            description: "Statistical Trading Analysis System".to_string(),
            private: false,
            api_base: "https://api.github.com".to_string(),
            timeout_secs: 30,
            primary_branch: "main".to_string(),
            fallback_branch: "master".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// Extra inputs for the conversation-log scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConversationSettings {
    /// Shell history files scanned in addition to PowerShell's console history.
    pub history_files: Vec<PathBuf>,
}

/// Load `<root>/automation/dashrun.yaml`, falling back to defaults when absent.
pub fn load_at(root: &Path) -> Result<Settings, ConfigError> {
    let path = paths::settings_path(root);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::ParseYaml { path, source })
}
