//! `dashrun conversations` — append a session to the conversation log.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use dashrun_core::settings;
use dashrun_docs::ConversationUpdater;

use super::RootArg;

/// Arguments for `dashrun conversations`.
#[derive(Args, Debug)]
pub struct ConversationsArgs {
    #[command(flatten)]
    pub root: RootArg,
}

impl ConversationsArgs {
    pub fn run(self) -> Result<()> {
        let root = self.root.resolve()?;
        dashrun_daemon::init_tracing();
        let settings = settings::load_at(&root).context("failed to load dashrun.yaml")?;
        let report = ConversationUpdater::from_settings(&root, &settings)
            .run()
            .context("conversation update failed")?;

        match report.session_number {
            Some(n) if report.session_created => println!(
                "{} session #{n:03} added ({} activities)",
                "✓".green().bold(),
                report.new_activities
            ),
            _ => println!("{} no new activity since the last update", "·".bright_black()),
        }
        Ok(())
    }
}
