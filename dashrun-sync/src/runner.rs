//! Subprocess seam for version-control commands.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::SyncError;

/// Captured result of one command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process was killed by a signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs version-control subcommands, e.g. `run(&["status", "--porcelain"])`.
///
/// A non-zero exit is an `Ok` result; `Err` means the command could not be
/// run at all.
pub trait CommandRunner {
    fn run(&self, args: &[&str]) -> Result<CommandOutput, SyncError>;
}

/// [`CommandRunner`] backed by the `git` executable, run in a project root.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    program: String,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            program: "git".to_string(),
        }
    }

    /// Use a different executable name or path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CommandRunner for GitCli {
    fn run(&self, args: &[&str]) -> Result<CommandOutput, SyncError> {
        tracing::debug!(args = ?args, "running {}", self.program);
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| SyncError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run `args` and turn a non-zero exit into [`SyncError::Git`].
pub(crate) fn run_checked(
    runner: &dyn CommandRunner,
    args: &[&str],
) -> Result<CommandOutput, SyncError> {
    let output = runner.run(args)?;
    if output.success() {
        Ok(output)
    } else {
        Err(SyncError::Git {
            command: args.join(" "),
            stderr: output.stderr.trim().to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    //! A runner that replays canned replies and records every call.

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        replies: RefCell<VecDeque<(String, CommandOutput)>>,
        pub(crate) calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Expect `command` next and answer with `code`/`stdout`/`stderr`.
        pub(crate) fn expect(self, command: &str, code: i32, stdout: &str, stderr: &str) -> Self {
            self.replies.borrow_mut().push_back((
                command.to_string(),
                CommandOutput {
                    code,
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                },
            ));
            self
        }

        pub(crate) fn ok(self, command: &str, stdout: &str) -> Self {
            self.expect(command, 0, stdout, "")
        }

        pub(crate) fn fail(self, command: &str, stderr: &str) -> Self {
            self.expect(command, 1, "", stderr)
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        pub(crate) fn exhausted(&self) -> bool {
            self.replies.borrow().is_empty()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, args: &[&str]) -> Result<CommandOutput, SyncError> {
            let command = args.join(" ");
            self.calls.borrow_mut().push(command.clone());
            let Some((expected, reply)) = self.replies.borrow_mut().pop_front() else {
                panic!("unexpected command: git {command}");
            };
            assert!(
                command.starts_with(&expected),
                "expected `git {expected}…`, got `git {command}`"
            );
            Ok(reply)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::new(dir.path()).with_program("definitely-not-a-vcs-binary");
        let err = git.run(&["--version"]).unwrap_err();
        assert!(matches!(err, SyncError::Spawn { .. }), "got: {err}");
    }

    #[test]
    fn checked_run_surfaces_stderr() {
        let runner = scripted::ScriptedRunner::new().fail("commit", "nothing added\n");
        let err = run_checked(&runner, &["commit", "-m", "x"]).unwrap_err();
        assert_eq!(err.to_string(), "`git commit -m x` failed: nothing added");
    }
}
