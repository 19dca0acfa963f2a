//! Read-only check of the local repository state.

use std::fmt;
use std::path::Path;

use dashrun_core::paths;

use crate::runner::CommandRunner;

/// Whether the project can be synced as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Ready,
    /// The client could not be run; carries the reason.
    ToolMissing(String),
    /// The client works but the project has no `.git` directory.
    NotARepository,
}

impl ProbeStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProbeStatus::Ready)
    }

    /// Human-readable explanation; never empty.
    pub fn detail(&self) -> String {
        match self {
            ProbeStatus::Ready => "git is set up".to_string(),
            ProbeStatus::ToolMissing(reason) => format!("git is not installed: {reason}"),
            ProbeStatus::NotARepository => "the directory is not a Git repository".to_string(),
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail())
    }
}

/// Check that `git --version` runs and that `root` has tracking metadata.
pub fn probe(runner: &dyn CommandRunner, root: &Path) -> ProbeStatus {
    match runner.run(&["--version"]) {
        Ok(out) if out.success() => {}
        Ok(out) => {
            let reason = out.stderr.trim();
            let reason = if reason.is_empty() {
                format!("exit code {}", out.code)
            } else {
                reason.to_string()
            };
            return ProbeStatus::ToolMissing(reason);
        }
        Err(err) => return ProbeStatus::ToolMissing(err.to_string()),
    }
    if paths::git_dir(root).exists() {
        ProbeStatus::Ready
    } else {
        ProbeStatus::NotARepository
    }
}
