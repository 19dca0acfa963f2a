pub mod conversations;
pub mod docs;
pub mod github;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

/// `--root`, shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct RootArg {
    /// Project directory (defaults to the current directory).
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

impl RootArg {
    pub fn resolve(&self) -> Result<PathBuf> {
        resolve_root(&self.root)
    }
}

fn resolve_root(root: &Path) -> Result<PathBuf> {
    let resolved = std::fs::canonicalize(root)
        .with_context(|| format!("project directory {} not found", root.display()))?;
    anyhow::ensure!(
        resolved.is_dir(),
        "project root {} is not a directory",
        resolved.display()
    );
    Ok(resolved)
}
