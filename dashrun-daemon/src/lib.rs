//! HTTP endpoint for the project dashboard.
//!
//! A single `POST /` accepts `{"action": ...}` and runs the matching
//! documentation, conversation-log or GitHub action against the project root.

mod error;
pub mod actions;
pub mod protocol;
mod runtime;

pub use actions::{dispatch, ActionHandler, ProjectActions};
pub use error::DaemonError;
pub use protocol::{Action, ActionRequest, ActionResponse};
pub use runtime::{init_tracing, run, serve, start_blocking};
