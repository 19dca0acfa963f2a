//! The repository workflow with its collaborators injected.
//!
//! ```text
//! run_full_setup:  probe ─┬─ ready ───────────────┐
//!                         └─ not a repo → init ───┤
//!                  create remote ─┬─ created ─────┤
//!                                 └─ exists → url from saved config, else fail
//!                  link origin → initial commit + push
//!
//! sync:            add → (clean? done) → commit → push
//! ```

use std::path::Path;

use chrono::{Local, NaiveDateTime};

use dashrun_core::settings::GitHubSettings;
use dashrun_core::{ConfigStore, Identity};

use crate::commit::{self, BranchNames, InitialPush, SyncOutcome};
use crate::error::SyncError;
use crate::init::{self, InitReport};
use crate::link::{self, LinkOutcome};
use crate::probe::{self, ProbeStatus};
use crate::remote::{self, CreatedRepository, HostingProvider, NewRepository};
use crate::runner::CommandRunner;

/// Where the remote URL used by a setup run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteSource {
    Created,
    /// Creation reported a conflict and the saved config supplied the URL.
    SavedConfig,
}

/// Everything a successful full setup did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOutcome {
    pub repo_url: String,
    pub remote: RemoteSource,
    /// `None` when the project was already a repository.
    pub init: Option<InitReport>,
    pub link: LinkOutcome,
    pub push: InitialPush,
}

/// What [`GitHubSync::sync_or_setup`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Synced(SyncOutcome),
    Created(SetupOutcome),
}

pub struct GitHubSync<'a> {
    root: &'a Path,
    runner: &'a dyn CommandRunner,
    provider: &'a dyn HostingProvider,
    store: &'a dyn ConfigStore,
    github: &'a GitHubSettings,
    identity: &'a Identity,
    token: Option<String>,
}

impl<'a> GitHubSync<'a> {
    /// The token is resolved from `store`, then from `github.token_env`.
    pub fn new(
        root: &'a Path,
        runner: &'a dyn CommandRunner,
        provider: &'a dyn HostingProvider,
        store: &'a dyn ConfigStore,
        github: &'a GitHubSettings,
        identity: &'a Identity,
    ) -> Self {
        let token = dashrun_core::resolve_token(store, &github.token_env);
        Self {
            root,
            runner,
            provider,
            store,
            github,
            identity,
            token,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn probe(&self) -> ProbeStatus {
        probe::probe(self.runner, self.root)
    }

    pub fn initialize(&self) -> Result<InitReport, SyncError> {
        init::initialize(self.runner, self.root, self.identity)
    }

    pub fn create_remote(&self) -> Result<CreatedRepository, SyncError> {
        remote::create_remote(
            self.provider,
            self.store,
            self.token.as_deref(),
            &self.github.token_env,
            &NewRepository::from_settings(self.github),
        )
    }

    pub fn link_remote(&self, url: &str) -> Result<LinkOutcome, SyncError> {
        link::link_remote(self.runner, url)
    }

    pub fn initial_commit_and_push(&self) -> Result<InitialPush, SyncError> {
        commit::initial_commit_and_push(self.runner, &self.branches(), now())
    }

    pub fn sync(&self) -> Result<SyncOutcome, SyncError> {
        commit::sync(self.runner, now())
    }

    /// First-run path; stops at the first failing step.
    pub fn run_full_setup(&self) -> Result<SetupOutcome, SyncError> {
        let init = match self.probe() {
            ProbeStatus::Ready => None,
            ProbeStatus::NotARepository => Some(self.initialize()?),
            ProbeStatus::ToolMissing(reason) => return Err(SyncError::ToolMissing(reason)),
        };

        let (repo_url, remote) = match self.create_remote() {
            Ok(created) => (created.clone_url, RemoteSource::Created),
            Err(SyncError::RepositoryExists { name }) => match self.saved_url() {
                Some(url) => {
                    tracing::info!(%url, "repository exists, using saved config");
                    (url, RemoteSource::SavedConfig)
                }
                None => return Err(SyncError::RepositoryExists { name }),
            },
            Err(err) => return Err(err),
        };

        let link = self.link_remote(&repo_url)?;
        let push = self.initial_commit_and_push()?;
        tracing::info!(url = %repo_url.trim_end_matches(".git"), "repository set up and pushed");
        Ok(SetupOutcome {
            repo_url,
            remote,
            init,
            link,
            push,
        })
    }

    /// Sync when the project is already a repository, full setup otherwise.
    pub fn sync_or_setup(&self) -> Result<SyncAction, SyncError> {
        if self.probe().is_ready() {
            self.sync().map(SyncAction::Synced)
        } else {
            self.run_full_setup().map(SyncAction::Created)
        }
    }

    fn branches(&self) -> BranchNames {
        BranchNames {
            primary: self.github.primary_branch.clone(),
            fallback: self.github.fallback_branch.clone(),
        }
    }

    fn saved_url(&self) -> Option<String> {
        match self.store.load() {
            Ok(record) => record.and_then(|r| r.url().map(str::to_string)),
            Err(err) => {
                tracing::warn!(error = %err, "saved config unreadable");
                None
            }
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
