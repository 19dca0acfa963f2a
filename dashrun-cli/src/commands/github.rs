//! `dashrun github` — probe, sync, or set up the GitHub remote.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use dashrun_sync::{pipeline, ProbeStatus, ProjectSync, SyncMode};

use super::RootArg;

#[derive(Subcommand, Debug)]
pub enum GithubCommand {
    /// Report whether git is installed and the project is a repository.
    Probe(RootArg),
    /// Commit and push local changes.
    Sync(RootArg),
    /// Initialize, create the GitHub repository, link and push.
    Setup(RootArg),
}

pub fn run(command: GithubCommand) -> Result<()> {
    dashrun_daemon::init_tracing();
    match command {
        GithubCommand::Probe(root) => {
            let project = load(&root)?;
            let status = project.probe();
            let mark = match status {
                ProbeStatus::Ready => "✓".green().bold(),
                _ => "✗".red().bold(),
            };
            println!("{mark} {status}");
        }
        GithubCommand::Sync(root) => {
            let project = load(&root)?;
            anyhow::ensure!(
                project.probe().is_ready(),
                "{}; run `dashrun github setup` first",
                project.probe()
            );
            let action = project.run(SyncMode::SyncOnly).context("sync failed")?;
            println!("{} {}", "✓".green().bold(), pipeline::describe(&action));
        }
        GithubCommand::Setup(root) => {
            let project = load(&root)?;
            anyhow::ensure!(
                project.workflow().has_token(),
                "no GitHub token found; set {} or add github_token to automation/github_config.json",
                project.settings().github.token_env
            );
            let action = project.run(SyncMode::Setup).context("setup failed")?;
            println!("{} {}", "✓".green().bold(), pipeline::describe(&action));
        }
    }
    Ok(())
}

fn load(root: &RootArg) -> Result<ProjectSync> {
    let root = root.resolve()?;
    ProjectSync::load(&root).context("failed to load project settings")
}
