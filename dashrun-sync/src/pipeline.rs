//! Shared sync entrypoint used by the CLI and the daemon.

use std::path::{Path, PathBuf};

use dashrun_core::{FileConfigStore, Settings};

use crate::commit::SyncOutcome;
use crate::error::SyncError;
use crate::probe::ProbeStatus;
use crate::remote::GitHubApi;
use crate::runner::GitCli;
use crate::workflow::{GitHubSync, SetupOutcome, SyncAction};

/// Which part of the workflow to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Sync when ready, full setup otherwise.
    Auto,
    /// Steady-state sync only.
    SyncOnly,
    /// Full setup only.
    Setup,
}

/// Production collaborators for one project root.
pub struct ProjectSync {
    root: PathBuf,
    git: GitCli,
    api: GitHubApi,
    store: FileConfigStore,
    settings: Settings,
}

impl ProjectSync {
    pub fn new(root: &Path, settings: Settings) -> Self {
        Self {
            root: root.to_path_buf(),
            git: GitCli::new(root),
            api: GitHubApi::from_settings(&settings.github),
            store: FileConfigStore::for_project(root),
            settings,
        }
    }

    /// Load `automation/dashrun.yaml` under `root` and build the collaborators.
    pub fn load(root: &Path) -> Result<Self, SyncError> {
        let settings = dashrun_core::settings::load_at(root)?;
        Ok(Self::new(root, settings))
    }

    pub fn workflow(&self) -> GitHubSync<'_> {
        GitHubSync::new(
            &self.root,
            &self.git,
            &self.api,
            &self.store,
            &self.settings.github,
            &self.settings.identity,
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn probe(&self) -> ProbeStatus {
        self.workflow().probe()
    }

    pub fn run(&self, mode: SyncMode) -> Result<SyncAction, SyncError> {
        let flow = self.workflow();
        match mode {
            SyncMode::Auto => flow.sync_or_setup(),
            SyncMode::SyncOnly => flow.sync().map(SyncAction::Synced),
            SyncMode::Setup => flow.run_full_setup().map(SyncAction::Created),
        }
    }
}

/// One-line summary for logs and CLI output.
pub fn describe(action: &SyncAction) -> String {
    match action {
        SyncAction::Synced(SyncOutcome::UpToDate) => "no new changes to sync".to_string(),
        SyncAction::Synced(SyncOutcome::Pushed) => "changes committed and pushed".to_string(),
        SyncAction::Created(SetupOutcome { repo_url, push, .. }) => {
            format!("repository {} set up and pushed to {}", repo_url, push.branch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_uses_project_settings() {
        let root = TempDir::new().expect("root");
        let dir = dashrun_core::paths::automation_dir(root.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dashrun_core::paths::settings_path(root.path()),
            "github:\n  primary_branch: trunk\n",
        )
        .unwrap();

        let project = ProjectSync::load(root.path()).expect("load");
        assert_eq!(project.settings().github.primary_branch, "trunk");
        assert!(project.git.root().ends_with(root.path().file_name().unwrap()));
    }

    #[test]
    fn malformed_settings_fail_to_load() {
        let root = TempDir::new().expect("root");
        std::fs::create_dir_all(dashrun_core::paths::automation_dir(root.path())).unwrap();
        std::fs::write(dashrun_core::paths::settings_path(root.path()), "github: [").unwrap();
        assert!(matches!(ProjectSync::load(root.path()), Err(SyncError::Config(_))));
    }
}
