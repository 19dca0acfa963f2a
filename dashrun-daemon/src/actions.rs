//! Action execution against a project root.
//!
//! Handlers are synchronous and may block for as long as git or the hosting
//! API takes; the runtime calls them on the blocking pool, one at a time.

use std::path::{Path, PathBuf};
use std::time::Instant;

use dashrun_core::{settings, Settings};
use dashrun_docs::{update_docs, ConversationUpdater};
use dashrun_sync::{ProjectSync, SyncAction, SyncMode};

use crate::protocol::{Action, ActionResponse};

/// Executes one dashboard action.
pub trait ActionHandler: Send + Sync + 'static {
    fn handle(&self, action: Action) -> ActionResponse;
}

/// Resolve a raw action name and run it; unknown names never reach `handler`.
pub fn dispatch(handler: &dyn ActionHandler, name: Option<&str>) -> ActionResponse {
    match name.and_then(Action::parse) {
        Some(action) => handler.handle(action),
        None => {
            tracing::warn!(action = ?name, "unrecognized action");
            ActionResponse::unrecognized(name)
        }
    }
}

/// The production handler. Settings are re-read for every action so edits to
/// `dashrun.yaml` apply without a restart.
#[derive(Debug, Clone)]
pub struct ProjectActions {
    root: PathBuf,
}

impl ProjectActions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn settings(&self) -> Result<Settings, String> {
        settings::load_at(&self.root).map_err(|e| e.to_string())
    }

    fn update_conversations(&self) -> ActionResponse {
        let settings = match self.settings() {
            Ok(s) => s,
            Err(err) => return ActionResponse::failure(format!("conversation update failed: {err}")),
        };
        match ConversationUpdater::from_settings(&self.root, &settings).run() {
            Ok(report) => ActionResponse {
                activities: Some(report.new_activities),
                ..ActionResponse::ok("Conversation log updated")
            },
            Err(err) => ActionResponse::failure(format!("conversation update failed: {err}")),
        }
    }

    fn update_docs(&self) -> ActionResponse {
        match update_docs(&self.root) {
            Ok(report) => ActionResponse {
                files_updated: Some(report.files_updated),
                updated_files: Some(report.updated_files),
                ..ActionResponse::ok(format!("Updated {} files", report.files_updated))
            },
            Err(err) => ActionResponse::failure(format!("documentation update failed: {err}")),
        }
    }

    fn github_sync(&self) -> ActionResponse {
        let project = match self.settings() {
            Ok(settings) => ProjectSync::new(&self.root, settings),
            Err(err) => return ActionResponse::failure(format!("GitHub sync failed: {err}")),
        };
        match project.run(SyncMode::Auto) {
            Ok(SyncAction::Synced(_)) => ActionResponse {
                action: Some("sync".to_string()),
                ..ActionResponse::ok("GitHub sync complete")
            },
            Ok(SyncAction::Created(setup)) => ActionResponse {
                action: Some("created".to_string()),
                repo_url: Some(setup.repo_url),
                ..ActionResponse::ok("GitHub repository created and synced")
            },
            Err(err) => ActionResponse::failure(format!("GitHub sync failed: {err}")),
        }
    }
}

impl ActionHandler for ProjectActions {
    fn handle(&self, action: Action) -> ActionResponse {
        let started = Instant::now();
        tracing::info!(%action, root = %self.root.display(), "running action");
        let response = match action {
            Action::UpdateConversations => self.update_conversations(),
            Action::UpdateDocs => self.update_docs(),
            Action::GithubSync => self.github_sync(),
        };
        let duration_ms = started.elapsed().as_millis();
        match &response.error {
            None => tracing::info!(%action, duration_ms, "action finished"),
            Some(error) => tracing::warn!(%action, duration_ms, %error, "action failed"),
        }
        response
    }
}
