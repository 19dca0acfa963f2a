//! # dashrun-sync
//!
//! Git/GitHub workflow for a project directory.
//!
//! Building blocks, each taking its collaborators explicitly:
//! [`probe`](probe::probe), [`initialize`](init::initialize),
//! [`create_remote`](remote::create_remote), [`link_remote`](link::link_remote),
//! [`initial_commit_and_push`](commit::initial_commit_and_push) and
//! [`sync`](commit::sync). [`GitHubSync`] strings them together and
//! [`ProjectSync`] wires the production implementations for a project root.

pub mod commit;
pub mod error;
pub mod init;
pub mod link;
pub mod pipeline;
pub mod probe;
pub mod remote;
pub mod runner;
pub mod workflow;

pub use commit::{CommitOutcome, InitialPush, SyncOutcome};
pub use error::SyncError;
pub use link::LinkOutcome;
pub use pipeline::{ProjectSync, SyncMode};
pub use probe::ProbeStatus;
pub use remote::{ApiReply, CreatedRepository, GitHubApi, HostingProvider, NewRepository};
pub use runner::{CommandOutput, CommandRunner, GitCli};
pub use workflow::{GitHubSync, RemoteSource, SetupOutcome, SyncAction};
