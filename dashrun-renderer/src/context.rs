//! Serializable contexts handed to the Tera templates.
//!
//! Each context is built from plain inputs (a source file, a list of
//! [`Activity`] records) so the templates never see filesystem or clock state
//! directly.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use dashrun_core::{Activity, ActivityKind};

use crate::error::RenderError;

/// Project name shown in page titles and the log heading.
pub const PROJECT_NAME: &str = "Trading Project 002";

/// Technical-activity lines kept in one session entry.
pub const MAX_TECHNICAL_LINES: usize = 5;

// ---------------------------------------------------------------------------
// Generated documentation page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuickLink {
    pub href: String,
    pub label: String,
}

impl QuickLink {
    fn new(href: &str, label: &str) -> Self {
        Self {
            href: href.to_string(),
            label: label.to_string(),
        }
    }
}

/// Links rendered in every page's quick-access block.
pub fn default_quick_links() -> Vec<QuickLink> {
    vec![
        QuickLink::new("project_dashboard.html", "🏠 Dashboard"),
        QuickLink::new("readme.html", "📖 README"),
        QuickLink::new("prd.html", "📋 PRD"),
        QuickLink::new("current_status.html", "📊 Current status"),
        QuickLink::new("conversation_log.html", "💬 Conversation log"),
        QuickLink::new("tasks.html", "🎯 Tasks"),
        QuickLink::new("database.html", "🗃️ Database"),
        QuickLink::new("strategy.html", "🚀 Strategy"),
        QuickLink::new("statistics.html", "📊 Statistics"),
        QuickLink::new("interactive_brokers.html", "🔗 IB connection"),
        QuickLink::new("file_map.html", "🗂️ File map"),
        QuickLink::new("rtl_editor.html", "📝 RTL Editor"),
    ]
}

/// Context for `doc_page.html.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct DocPageContext {
    pub project_name: String,
    pub title: String,
    /// Already-converted Markdown body; inserted unescaped.
    pub body_html: String,
    /// Source size in KiB, one decimal.
    pub size_kb: String,
    /// Source modification time, `%d-%m-%Y %H:%M`, or `unknown`.
    pub modified: String,
    pub source_name: String,
    pub generated_at: String,
    pub dashboard_href: String,
    pub quick_links: Vec<QuickLink>,
}

impl DocPageContext {
    /// Page context with unknown source stats and the current time as the
    /// generation stamp. Chain [`DocPageContext::with_source_stats`] to fill
    /// in the source file metadata.
    pub fn new(title: impl Into<String>, body_html: impl Into<String>, source_name: &str) -> Self {
        Self {
            project_name: PROJECT_NAME.to_string(),
            title: title.into(),
            body_html: body_html.into(),
            size_kb: format_size_kb(0),
            modified: "unknown".to_string(),
            source_name: source_name.to_string(),
            generated_at: Local::now().format("%d %B %Y, %H:%M").to_string(),
            dashboard_href: "project_dashboard.html".to_string(),
            quick_links: default_quick_links(),
        }
    }

    pub fn with_source_stats(mut self, size_bytes: u64, modified: NaiveDateTime) -> Self {
        self.size_kb = format_size_kb(size_bytes);
        self.modified = modified.format("%d-%m-%Y %H:%M").to_string();
        self
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// `1536` → `"1.5"`.
pub fn format_size_kb(size_bytes: u64) -> String {
    format!("{:.1}", size_bytes as f64 / 1024.0)
}

// ---------------------------------------------------------------------------
// Conversation-log session entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileChangeLine {
    pub file: String,
    /// `%H:%M` of the change.
    pub time: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TechnicalLine {
    pub label: String,
    pub description: String,
}

/// Context for `session.md.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub session_number: u32,
    /// Zero-padded to three digits.
    pub session_label: String,
    /// ISO date, so the entry can be found again by the session-date scan.
    pub date: String,
    pub time: String,
    pub achievements: Vec<String>,
    pub file_changes: Vec<FileChangeLine>,
    pub technical: Vec<TechnicalLine>,
    pub issues: Vec<String>,
    pub update_time: String,
    pub activity_count: usize,
    pub files_changed: usize,
    pub previous_update: String,
}

impl SessionContext {
    /// Summarise `activities` into a session entry stamped at `now`.
    pub fn from_activities(
        session_number: u32,
        activities: &[Activity],
        now: NaiveDateTime,
        previous_update: NaiveDateTime,
    ) -> Self {
        let file_changes: Vec<FileChangeLine> = activities
            .iter()
            .filter(|a| a.kind == ActivityKind::FileChange)
            .map(|a| FileChangeLine {
                file: a.file.clone().unwrap_or_else(|| "file".to_string()),
                time: a.timestamp.format("%H:%M").to_string(),
            })
            .collect();

        let technical: Vec<TechnicalLine> = activities
            .iter()
            .filter_map(|a| {
                let label = match a.kind {
                    ActivityKind::ClaudeActivity => "Claude",
                    ActivityKind::LogEntry => "Log",
                    ActivityKind::FileChange => return None,
                };
                Some(TechnicalLine {
                    label: label.to_string(),
                    description: a.description.clone(),
                })
            })
            .take(MAX_TECHNICAL_LINES)
            .collect();

        Self {
            session_number,
            session_label: format!("{session_number:03}"),
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M").to_string(),
            achievements: activities.iter().filter_map(achievement_for).collect(),
            files_changed: file_changes.len(),
            file_changes,
            technical,
            issues: activities
                .iter()
                .filter(|a| a.description.to_lowercase().contains("error"))
                .map(|a| format!("Error detected: {}", a.description))
                .collect(),
            update_time: now.format("%H:%M:%S").to_string(),
            activity_count: activities.len(),
            previous_update: previous_update.format("%d/%m/%Y %H:%M").to_string(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

fn achievement_for(activity: &Activity) -> Option<String> {
    if activity.kind == ActivityKind::FileChange {
        let file = activity.file.as_deref().unwrap_or("file");
        return Some(format!("Updated file: {file}"));
    }
    let desc = activity.description.to_lowercase();
    if desc.contains("commit") {
        Some("Git commit recorded".to_string())
    } else if desc.contains("claude") {
        Some("Worked with Claude Code".to_string())
    } else if desc.contains("python") {
        Some("Ran a Python script".to_string())
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Fresh conversation log
// ---------------------------------------------------------------------------

/// Context for `conversation_log.md.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct InitialLogContext {
    pub project_name: String,
    pub project_description: String,
    /// Entries directly under the project root when the log was created.
    pub file_count: usize,
    pub updated_at: String,
}

impl InitialLogContext {
    pub fn new(project_description: impl Into<String>, file_count: usize, now: NaiveDateTime) -> Self {
        Self {
            project_name: PROJECT_NAME.to_string(),
            project_description: project_description.into(),
            file_count,
            updated_at: now.format("%d %B %Y, %H:%M").to_string(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
