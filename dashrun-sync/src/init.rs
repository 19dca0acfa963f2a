//! First-time local repository setup.
//!
//! Steps run in table order; a failing required step aborts, a failing
//! optional step is logged and recorded in the report.

use std::fmt;
use std::path::Path;

use dashrun_core::{paths, Identity};

use crate::error::SyncError;
use crate::runner::{run_checked, CommandRunner};

/// Contents written to `.gitignore` on initialization.
pub const IGNORE_LIST: &str = "# Python
__pycache__/
*.py[cod]
*$py.class
*.so
.Python
env/
venv/
.venv
pip-log.txt
pip-delete-this-directory.txt
.tox
.coverage
.coverage.*
.cache
nosetests.xml
coverage.xml
*.cover
*.log

# IDE
.vscode/
.idea/
*.swp
*.swo
*~

# OS
.DS_Store
Thumbs.db

# Project specific
automation/github_config.json
automation/last_*.json
*.tmp
temp/

# Sensitive data
*.key
*.pem
config/secrets.json
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// `git init`.
    CreateMetadata,
    /// Overwrite `.gitignore` with [`IGNORE_LIST`].
    WriteIgnoreList,
    /// Set `user.email`/`user.name` when no email is configured.
    DefaultIdentity,
}

impl InitStep {
    pub fn name(&self) -> &'static str {
        match self {
            InitStep::CreateMetadata => "create metadata",
            InitStep::WriteIgnoreList => "write ignore list",
            InitStep::DefaultIdentity => "default identity",
        }
    }
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(step, required)` in execution order.
pub const INIT_STEPS: &[(InitStep, bool)] = &[
    (InitStep::CreateMetadata, true),
    (InitStep::WriteIgnoreList, false),
    (InitStep::DefaultIdentity, false),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Nothing to do, e.g. an identity was already configured.
    Skipped,
    /// An optional step failed; the message is kept for the report.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitReport {
    /// `.git` already existed and nothing was run.
    pub already_initialized: bool,
    pub steps: Vec<(InitStep, StepOutcome)>,
}

/// Create a repository in `root` unless one exists.
pub fn initialize(
    runner: &dyn CommandRunner,
    root: &Path,
    identity: &Identity,
) -> Result<InitReport, SyncError> {
    if paths::git_dir(root).exists() {
        tracing::info!("git repository already present");
        return Ok(InitReport {
            already_initialized: true,
            steps: Vec::new(),
        });
    }

    tracing::info!(root = %root.display(), "initializing git repository");
    let mut report = InitReport::default();
    for (step, required) in INIT_STEPS {
        let outcome = match run_step(*step, runner, root, identity) {
            Ok(outcome) => outcome,
            Err(err) if *required => {
                return Err(SyncError::Init {
                    step: step.name(),
                    detail: err.to_string(),
                });
            }
            Err(err) => {
                tracing::warn!(step = %step, error = %err, "optional init step failed");
                StepOutcome::Failed(err.to_string())
            }
        };
        report.steps.push((*step, outcome));
    }
    Ok(report)
}

fn run_step(
    step: InitStep,
    runner: &dyn CommandRunner,
    root: &Path,
    identity: &Identity,
) -> Result<StepOutcome, SyncError> {
    match step {
        InitStep::CreateMetadata => {
            run_checked(runner, &["init"])?;
            Ok(StepOutcome::Done)
        }
        InitStep::WriteIgnoreList => {
            let path = paths::gitignore_path(root);
            std::fs::write(&path, IGNORE_LIST).map_err(|e| crate::error::io_err(&path, e))?;
            Ok(StepOutcome::Done)
        }
        InitStep::DefaultIdentity => {
            let current = runner.run(&["config", "user.email"])?;
            if current.success() && !current.stdout.trim().is_empty() {
                return Ok(StepOutcome::Skipped);
            }
            run_checked(runner, &["config", "user.email", &identity.email])?;
            run_checked(runner, &["config", "user.name", &identity.name])?;
            tracing::info!(name = %identity.name, "set default git identity");
            Ok(StepOutcome::Done)
        }
    }
}
