//! Staging, committing, and pushing.

use chrono::NaiveDateTime;

use crate::error::SyncError;
use crate::runner::{run_checked, CommandRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
}

/// Result of the first-run commit and push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialPush {
    pub commit: CommitOutcome,
    /// Branch name that was pushed.
    pub branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The tree had no changes; nothing was committed or pushed.
    UpToDate,
    Pushed,
}

/// Branch names tried, in order, by the first push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchNames {
    pub primary: String,
    pub fallback: String,
}

impl Default for BranchNames {
    fn default() -> Self {
        Self {
            primary: "main".to_string(),
            fallback: "master".to_string(),
        }
    }
}

pub fn initial_commit_message(now: NaiveDateTime) -> String {
    format!(
        "Initial commit - Trading Project 002\n\n\
         Statistical Trading Analysis System\n\
         Created: {}",
        now.format("%d %B %Y")
    )
}

pub fn sync_commit_message(now: NaiveDateTime) -> String {
    format!(
        "Automatic sync - {}\n\n\
         Automatic project update, including documentation and HTML pages.",
        now.format("%d/%m/%Y %H:%M")
    )
}

/// `true` when `git status --porcelain` reports anything.
pub fn has_changes(runner: &dyn CommandRunner) -> Result<bool, SyncError> {
    let status = run_checked(runner, &["status", "--porcelain"])?;
    Ok(!status.stdout.trim().is_empty())
}

/// Stage everything, commit if the tree changed, then push the primary
/// branch, falling back to the secondary name once.
///
/// The push runs even when there was nothing to commit.
pub fn initial_commit_and_push(
    runner: &dyn CommandRunner,
    branches: &BranchNames,
    now: NaiveDateTime,
) -> Result<InitialPush, SyncError> {
    run_checked(runner, &["add", "."])?;

    let commit = if has_changes(runner)? {
        run_checked(runner, &["commit", "-m", &initial_commit_message(now)])?;
        tracing::info!("created initial commit");
        CommitOutcome::Committed
    } else {
        tracing::info!("nothing to commit");
        CommitOutcome::NothingToCommit
    };

    let primary = runner.run(&["push", "-u", "origin", &branches.primary])?;
    if primary.success() {
        return Ok(InitialPush {
            commit,
            branch: branches.primary.clone(),
        });
    }
    tracing::warn!(
        branch = %branches.primary,
        stderr = %primary.stderr.trim(),
        "push failed, trying {}",
        branches.fallback
    );
    let fallback = runner.run(&["push", "-u", "origin", &branches.fallback])?;
    if fallback.success() {
        return Ok(InitialPush {
            commit,
            branch: branches.fallback.clone(),
        });
    }
    Err(SyncError::Push {
        stderr: fallback.stderr.trim().to_string(),
    })
}

/// Steady-state sync: stage, commit when changed, push to the upstream.
///
/// A failed push after a successful commit is an error and the commit stays.
pub fn sync(runner: &dyn CommandRunner, now: NaiveDateTime) -> Result<SyncOutcome, SyncError> {
    match runner.run(&["add", "."]) {
        Ok(out) if !out.success() => {
            tracing::warn!(stderr = %out.stderr.trim(), "git add reported a problem");
        }
        Err(err) => tracing::warn!(error = %err, "git add could not run"),
        Ok(_) => {}
    }

    if !has_changes(runner)? {
        tracing::info!("no changes to sync");
        return Ok(SyncOutcome::UpToDate);
    }

    run_checked(runner, &["commit", "-m", &sync_commit_message(now)])?;
    let push = runner.run(&["push"])?;
    if !push.success() {
        return Err(SyncError::PushAfterCommit {
            stderr: push.stderr.trim().to_string(),
        });
    }
    tracing::info!("sync pushed");
    Ok(SyncOutcome::Pushed)
}
