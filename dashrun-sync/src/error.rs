//! Error types for dashrun-sync.

use std::path::PathBuf;

use thiserror::Error;

use dashrun_core::ConfigError;

/// All errors that can arise from the repository workflow.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The version-control client could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The version-control client is missing or unusable.
    #[error("git is not available: {0}")]
    ToolMissing(String),

    /// A git subcommand exited non-zero; `stderr` is passed through verbatim.
    #[error("`git {command}` failed: {stderr}")]
    Git { command: String, stderr: String },

    /// A required initialization step failed.
    #[error("repository initialization failed at {step}: {detail}")]
    Init { step: &'static str, detail: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No access token in the config record or the environment.
    #[error("no GitHub token found; set {env_var} or add github_token to automation/github_config.json")]
    MissingToken { env_var: String },

    #[error("repository {name} already exists")]
    RepositoryExists { name: String },

    /// Any other non-success reply from the hosting provider.
    #[error("repository creation failed: {status} - {body}")]
    Api { status: u16, body: String },

    /// Transport failure or timeout talking to the hosting provider.
    #[error("could not reach the GitHub API: {0}")]
    Network(String),

    #[error("unexpected GitHub API response: {0}")]
    InvalidApiResponse(String),

    /// Neither the primary nor the fallback branch could be pushed.
    #[error("push failed: {stderr}")]
    Push { stderr: String },

    /// The commit was created and kept, but pushing it failed.
    #[error("commit created but push failed: {stderr}")]
    PushAfterCommit { stderr: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
