//! Pointing `origin` at the remote repository.

use crate::error::SyncError;
use crate::runner::{run_checked, CommandRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// `origin` already contained the URL.
    AlreadyLinked,
    /// `origin` pointed elsewhere and was updated.
    Repointed,
    /// `origin` did not exist and was added.
    Added,
}

/// Make `origin` point at `url`. Calling it again with the same URL changes
/// nothing.
pub fn link_remote(runner: &dyn CommandRunner, url: &str) -> Result<LinkOutcome, SyncError> {
    let current = runner.run(&["remote", "get-url", "origin"])?;
    if current.success() {
        if current.stdout.trim().contains(url) {
            tracing::info!("origin already points at {url}");
            return Ok(LinkOutcome::AlreadyLinked);
        }
        run_checked(runner, &["remote", "set-url", "origin", url])?;
        tracing::info!(from = %current.stdout.trim(), "repointed origin to {url}");
        return Ok(LinkOutcome::Repointed);
    }
    run_checked(runner, &["remote", "add", "origin", url])?;
    tracing::info!("added origin {url}");
    Ok(LinkOutcome::Added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::scripted::ScriptedRunner;

    const URL: &str = "https://github.com/u/trading-project-002.git";

    #[test]
    fn unset_origin_is_added() {
        let runner = ScriptedRunner::new()
            .expect("remote get-url origin", 2, "", "error: No such remote 'origin'")
            .ok("remote add origin https://github.com/u/trading-project-002.git", "");
        assert_eq!(link_remote(&runner, URL).unwrap(), LinkOutcome::Added);
        assert!(runner.exhausted());
    }

    #[test]
    fn matching_origin_is_left_alone() {
        let runner = ScriptedRunner::new().ok("remote get-url origin", &format!("{URL}\n"));
        assert_eq!(link_remote(&runner, URL).unwrap(), LinkOutcome::AlreadyLinked);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn other_origin_is_repointed() {
        let runner = ScriptedRunner::new()
            .ok("remote get-url origin", "https://github.com/u/old.git\n")
            .ok("remote set-url origin", "");
        assert_eq!(link_remote(&runner, URL).unwrap(), LinkOutcome::Repointed);
    }

    #[test]
    fn failed_add_is_an_error() {
        let runner = ScriptedRunner::new()
            .expect("remote get-url origin", 2, "", "")
            .fail("remote add origin", "fatal: not a git repository");
        let err = link_remote(&runner, URL).unwrap_err();
        assert!(err.to_string().contains("not a git repository"));
    }
}
