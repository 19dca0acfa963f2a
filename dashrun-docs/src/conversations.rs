//! Conversation-log maintenance.
//!
//! # Flow
//!
//! 1. Work out when the log was last updated (marker file, then the last
//!    dated `Session #N` line, then one day ago).
//! 2. Gather activity newer than that and keep the project-relevant part.
//! 3. Nothing relevant: report zero and leave the log alone.
//! 4. Otherwise render a session entry, insert it before the statistics
//!    heading, and save the marker with the next session number.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;

use dashrun_core::config_store::{load_json_at, save_json_at};
use dashrun_core::{paths, Activity, LastUpdateMarker, Settings};
use dashrun_renderer::{InitialLogContext, SessionContext, TemplateEngine};

use crate::activity;
use crate::error::{io_err, DocsError};
use crate::writer::atomic_write;

/// Heading that new session entries are inserted in front of.
pub const STATS_MARKER: &str = "## 📈 **Project Statistics";

static SESSION_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Session #(\d+).*?(\d{4}-\d{2}-\d{2})").expect("session date pattern")
});
static SESSION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Session #(\d+)").expect("session number pattern"));

/// Outcome of one conversation-log pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationReport {
    pub new_activities: usize,
    pub session_created: bool,
    /// Number of the entry written, when one was.
    pub session_number: Option<u32>,
}

/// Scans a project for recent activity and records it in the log.
#[derive(Debug, Clone)]
pub struct ConversationUpdater {
    root: PathBuf,
    history_files: Vec<PathBuf>,
    project_description: String,
}

impl ConversationUpdater {
    /// Updater for `root` reading PowerShell's console history, if a home
    /// directory is known.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let history_files = dirs::home_dir()
            .map(|home| vec![paths::powershell_history_path(&home)])
            .unwrap_or_default();
        Self {
            root: root.into(),
            history_files,
            project_description: Settings::default().github.description,
        }
    }

    /// [`ConversationUpdater::new`] plus the configured extra history files.
    pub fn from_settings(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        let mut updater = Self::new(root);
        updater
            .history_files
            .extend(settings.conversations.history_files.iter().cloned());
        updater.project_description = settings.github.description.clone();
        updater
    }

    /// Replace the history sources.
    pub fn with_history_files(mut self, files: Vec<PathBuf>) -> Self {
        self.history_files = files;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Time of the previous update as recorded in the project.
    pub fn last_update_time(&self, now: NaiveDateTime) -> NaiveDateTime {
        let marker_path = paths::last_update_path(&self.root);
        match load_json_at::<LastUpdateMarker>(&marker_path) {
            Ok(Some(marker)) => marker.last_update,
            Ok(None) => {
                let log = std::fs::read_to_string(paths::conversation_log_path(&self.root))
                    .unwrap_or_default();
                last_session_date(&log)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap_or_else(|| now - Duration::days(1))
            }
            Err(err) => {
                tracing::warn!(error = %err, "unreadable update marker, looking back one day");
                now - Duration::days(1)
            }
        }
    }

    /// Every relevant activity newer than `since`.
    pub fn scan(&self, since: NaiveDateTime, now: NaiveDateTime) -> Vec<Activity> {
        let mut found = Vec::new();
        for history in &self.history_files {
            found.extend(activity::history_activities(history, since, now));
        }
        found.extend(activity::file_change_activities(&self.root, since));
        found.extend(activity::log_activities(&self.root, since));
        activity::filter_relevant(found)
    }

    /// Run one full pass.
    pub fn run(&self) -> Result<ConversationReport, DocsError> {
        let now = Local::now().naive_local();
        let since = self.last_update_time(now);
        tracing::info!(since = %since.format("%d/%m/%Y %H:%M"), "scanning for new activity");

        let activities = self.scan(since, now);
        if activities.is_empty() {
            tracing::info!("no new activity since the last update");
            return Ok(ConversationReport::default());
        }
        tracing::info!(count = activities.len(), "found new activity");

        let log_path = paths::conversation_log_path(&self.root);
        let existing = match std::fs::read_to_string(&log_path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(io_err(&log_path, err)),
        };

        let engine = TemplateEngine::new(Some(&paths::user_templates_dir(&self.root)))?;
        let session_number = next_session_number(existing.as_deref().unwrap_or_default());
        let session = engine.render_session(&SessionContext::from_activities(
            session_number,
            &activities,
            now,
            since,
        ))?;
        let base = match existing {
            Some(content) => content,
            None => engine.render_initial_log(&InitialLogContext::new(
                self.project_description.clone(),
                count_root_entries(&self.root),
                now,
            ))?,
        };
        atomic_write(&log_path, &insert_session(&base, &session))?;
        tracing::info!(session = session_number, "conversation log updated");

        let marker = LastUpdateMarker {
            last_update: Local::now().naive_local(),
            session_updated: session_number + 1,
        };
        if let Err(err) = save_json_at(&paths::last_update_path(&self.root), &marker) {
            tracing::warn!(error = %err, "could not save update marker");
        }

        Ok(ConversationReport {
            new_activities: activities.len(),
            session_created: true,
            session_number: Some(session_number),
        })
    }
}

// ---------------------------------------------------------------------------
// Log text helpers
// ---------------------------------------------------------------------------

/// Date of the last `Session #N … YYYY-MM-DD` line.
pub fn last_session_date(log: &str) -> Option<NaiveDate> {
    SESSION_DATE
        .captures_iter(log)
        .last()
        .and_then(|caps| caps.get(2))
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
}

/// One past the highest `Session #N` in the log, or 1.
pub fn next_session_number(log: &str) -> u32 {
    SESSION_NUMBER
        .captures_iter(log)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .map_or(1, |n| n.saturating_add(1))
}

/// Place `session` in front of [`STATS_MARKER`], or at the end without one.
pub fn insert_session(log: &str, session: &str) -> String {
    match log.find(STATS_MARKER) {
        Some(idx) => {
            let (head, tail) = log.split_at(idx);
            format!("{head}{session}\n{tail}")
        }
        None => format!("{log}{session}"),
    }
}

fn count_root_entries(root: &Path) -> usize {
    std::fs::read_dir(root)
        .map(|entries| entries.flatten().count())
        .unwrap_or(0)
}
