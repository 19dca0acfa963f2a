//! dashrun — dashboard automation for a local project directory.
//!
//! # Usage
//!
//! ```text
//! dashrun serve [--root DIR] [--host H] [--port P]
//! dashrun docs [--root DIR] [--json]
//! dashrun conversations [--root DIR]
//! dashrun github probe|sync|setup [--root DIR]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    conversations::ConversationsArgs, docs::DocsArgs, github::GithubCommand, serve::ServeArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "dashrun",
    version,
    about = "Run the project dashboard's documentation, conversation-log and GitHub actions",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the dashboard endpoint until Ctrl-C.
    Serve(ServeArgs),

    /// Regenerate HTML pages for changed Markdown files.
    Docs(DocsArgs),

    /// Append a session for recent activity to the conversation log.
    Conversations(ConversationsArgs),

    /// Git and GitHub synchronization.
    Github {
        #[command(subcommand)]
        command: GithubCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Docs(args) => args.run(),
        Commands::Conversations(args) => args.run(),
        Commands::Github { command } => commands::github::run(command),
    }
}
