//! Domain types shared by the dashrun crates.
//!
//! Persisted records keep the field names of the JSON documents that live in
//! `automation/`, so hand-edited files keep loading.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for the remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoName(pub String);

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// GitHub config record
// ---------------------------------------------------------------------------

/// Contents of `automation/github_config.json`.
///
/// Every field is optional: a hand-written file holding only a token is a
/// valid record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GitHubConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<RepoName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GitHubConfig {
    /// The stored token, if present and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// The stored clone URL, if present and non-blank.
    pub fn url(&self) -> Option<&str> {
        self.repo_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// The (name, email) pair applied to a fresh repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "Trading Project 002".to_string(),
            email: "trading.project.002@example.com".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation log marker
// ---------------------------------------------------------------------------

/// Contents of `automation/last_conversation_update.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUpdateMarker {
    /// Local wall-clock time of the last successful update.
    #[serde(deserialize_with = "deserialize_local_timestamp")]
    pub last_update: NaiveDateTime,
    /// Session number the next generated entry will carry.
    #[serde(default = "first_session")]
    pub session_updated: u32,
}

fn first_session() -> u32 {
    1
}

/// Accepts naive ISO-8601 (`2025-09-01T10:30:00.123456`) as well as RFC 3339
/// timestamps with an offset, which are converted to local wall-clock time.
fn deserialize_local_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_local_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognised timestamp '{raw}'"))
    })
}

/// Parse a timestamp the way the marker file accepts it.
pub fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::from_str(raw) {
        return Some(naive);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Local).naive_local())
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// Where an activity record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A shell-history line mentioning Claude or the project.
    ClaudeActivity,
    /// A project file modified since the last update.
    FileChange,
    /// A log file with recent Claude or error output.
    LogEntry,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::ClaudeActivity => write!(f, "claude_activity"),
            ActivityKind::FileChange => write!(f, "file_change"),
            ActivityKind::LogEntry => write!(f, "log_entry"),
        }
    }
}

/// One transient activity found while scanning for a conversation update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub timestamp: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
