//! Activity discovery for the conversation log.
//!
//! Three sources feed a scan, each limited to what changed after the last
//! update:
//!
//! | Source          | Produces          | Rule                                              |
//! |-----------------|-------------------|---------------------------------------------------|
//! | shell history   | `claude_activity` | last 200 lines of a history file newer than `since`, keyword lines only |
//! | project files   | `file_change`     | any file modified after `since`                   |
//! | log-like files  | `log_entry`       | `*.log`, `*.txt`, `debug*`, `error*` whose tail mentions Claude or an error |
//!
//! `.git` and `target` directories are never walked.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};

use dashrun_core::{Activity, ActivityKind};

/// Lines kept from the end of a history file.
pub const HISTORY_TAIL_LINES: usize = 200;
/// Characters inspected at the end of a log-like file.
pub const LOG_TAIL_CHARS: usize = 1000;

const SKIP_DIRS: &[&str] = &[".git", "target"];

const HISTORY_KEYWORDS: &[&str] = &[
    "claude",
    "anthropic",
    "claude-code",
    "npx @anthropic-ai/claude-code",
    "trading project",
    "project 002",
];

const RELEVANCE_KEYWORDS: &[&str] = &[
    "trading",
    "project",
    "002",
    "claude",
    "mstr",
    "html",
    "dashboard",
    "automation",
];

// ---------------------------------------------------------------------------
// Command analysis
// ---------------------------------------------------------------------------

/// Short human description of a shell command line.
pub fn analyze_command(command: &str) -> String {
    let command = command.to_lowercase();
    let has = |needle: &str| command.contains(needle);

    let description = if has("claude-code") || has("npx @anthropic-ai") {
        "Launched Claude Code"
    } else if has("git") {
        if has("commit") {
            "Git commit"
        } else if has("push") {
            "Git push"
        } else if has("pull") {
            "Git pull"
        } else {
            "Git activity"
        }
    } else if has("python") || has(".py") {
        "Ran Python script"
    } else if has("mkdir") || has("md ") {
        "Created directory"
    } else if has("touch") || has("new-item") {
        "Created new file"
    } else if has("edit") || has("code") {
        "Edited files"
    } else {
        let head: String = command.chars().take(50).collect();
        return format!("Terminal command: {head}");
    };
    description.to_string()
}

/// Keep activities whose command or description mentions the project.
pub fn filter_relevant(activities: Vec<Activity>) -> Vec<Activity> {
    activities
        .into_iter()
        .filter(|a| {
            let text = format!(
                "{} {}",
                a.command.as_deref().unwrap_or_default(),
                a.description
            )
            .to_lowercase();
            RELEVANCE_KEYWORDS.iter().any(|k| text.contains(k))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Keyword lines from the tail of `path`, stamped `now`.
///
/// Returns nothing when the file is missing, unreadable, or not modified
/// after `since`.
pub fn history_activities(path: &Path, since: NaiveDateTime, now: NaiveDateTime) -> Vec<Activity> {
    let Some(modified) = std::fs::metadata(path).ok().and_then(|m| modified_local(&m)) else {
        return Vec::new();
    };
    if modified <= since {
        return Vec::new();
    }
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot read shell history");
            return Vec::new();
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let tail = &lines[lines.len().saturating_sub(HISTORY_TAIL_LINES)..];

    tail.iter()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| HISTORY_KEYWORDS.iter().any(|k| line.contains(k)))
        .map(|line| Activity {
            kind: ActivityKind::ClaudeActivity,
            description: analyze_command(&line),
            file: None,
            command: Some(line),
            timestamp: now,
        })
        .collect()
}

/// Every project file modified after `since`.
pub fn file_change_activities(root: &Path, since: NaiveDateTime) -> Vec<Activity> {
    project_files(root)
        .into_iter()
        .filter_map(|path| {
            let modified = std::fs::metadata(&path).ok().and_then(|m| modified_local(&m))?;
            if modified <= since {
                return None;
            }
            let name = file_name(&path);
            Some(Activity {
                kind: ActivityKind::FileChange,
                description: format!("Updated file: {name}"),
                file: Some(name),
                command: None,
                timestamp: modified,
            })
        })
        .collect()
}

/// Log-like files modified after `since` whose last characters mention
/// Claude or an error. Each file is reported once.
pub fn log_activities(root: &Path, since: NaiveDateTime) -> Vec<Activity> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for path in project_files(root) {
        let name = file_name(&path);
        if !is_log_like(&name) || !seen.insert(path.clone()) {
            continue;
        }
        let Some(modified) = std::fs::metadata(&path).ok().and_then(|m| modified_local(&m)) else {
            continue;
        };
        if modified <= since {
            continue;
        }
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        let tail = last_chars(&String::from_utf8_lossy(&bytes), LOG_TAIL_CHARS).to_lowercase();
        if tail.contains("claude") || tail.contains("error") {
            out.push(Activity {
                kind: ActivityKind::LogEntry,
                description: format!("Log activity: {name}"),
                file: Some(name),
                command: None,
                timestamp: modified,
            });
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_log_like(name: &str) -> bool {
    name.ends_with(".log")
        || name.ends_with(".txt")
        || name.starts_with("debug")
        || name.starts_with("error")
}

fn last_chars(text: &str, n: usize) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    match text.char_indices().nth(count - n) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File modification time as local wall-clock time.
pub(crate) fn modified_local(meta: &std::fs::Metadata) -> Option<NaiveDateTime> {
    meta.modified().ok().map(system_to_local)
}

pub(crate) fn system_to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// All regular files under `root`, sorted, skipping [`SKIP_DIRS`].
fn project_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    collect_files(root, &mut out);
    out.sort();
    out
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            let skip = entry
                .file_name()
                .to_str()
                .is_some_and(|name| SKIP_DIRS.contains(&name));
            if !skip {
                collect_files(&path, out);
            }
        } else if file_type.is_file() {
            out.push(path);
        }
    }
}
