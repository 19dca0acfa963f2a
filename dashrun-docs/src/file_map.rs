//! Statistics refresh for `file_map.json`.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{io_err, DocsError};
use crate::writer::atomic_write;

/// Counts written into the file map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMapStats {
    pub html: usize,
    pub markdown: usize,
    /// `html + markdown + 1`, the map itself included.
    pub total: usize,
}

/// Refresh `last_updated` and the per-type counts in `<root>/file_map.json`.
///
/// Returns `Ok(None)` when the project has no file map; other keys in the
/// document are preserved.
pub fn update_file_map(root: &Path, today: NaiveDate) -> Result<Option<FileMapStats>, DocsError> {
    let path = dashrun_core::paths::file_map_path(root);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let mut doc: Value = serde_json::from_str(&raw).map_err(|source| DocsError::Json {
        path: path.clone(),
        source,
    })?;

    let html = count_with_extension(root, "html")?;
    let markdown = count_with_extension(root, "md")?;
    let stats = FileMapStats {
        html,
        markdown,
        total: html + markdown + 1,
    };

    let project_info = object_mut(&mut doc, "project_info", &path)?;
    project_info.insert(
        "last_updated".to_string(),
        Value::String(today.format("%Y-%m-%d").to_string()),
    );

    let statistics = object_mut(&mut doc, "statistics", &path)?;
    statistics.insert("total_files".to_string(), Value::from(stats.total));
    let by_type = statistics
        .entry("by_type")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(by_type) = by_type.as_object_mut() else {
        return Err(DocsError::FileMapShape {
            path,
            section: "statistics.by_type",
        });
    };
    by_type.insert("html".to_string(), Value::from(stats.html));
    by_type.insert("markdown".to_string(), Value::from(stats.markdown));

    atomic_write(&path, &to_four_space_json(&doc, &path)?)?;
    tracing::info!(html, markdown, "updated file map");
    Ok(Some(stats))
}

fn object_mut<'a>(
    doc: &'a mut Value,
    key: &'static str,
    path: &Path,
) -> Result<&'a mut Map<String, Value>, DocsError> {
    doc.get_mut(key)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| DocsError::FileMapShape {
            path: path.to_path_buf(),
            section: key,
        })
}

fn to_four_space_json(doc: &Value, path: &Path) -> Result<String, DocsError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser).map_err(|source| DocsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn count_with_extension(root: &Path, ext: &str) -> Result<usize, DocsError> {
    let entries = std::fs::read_dir(root).map_err(|e| io_err(root, e))?;
    Ok(entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some(ext))
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 21).unwrap()
    }

    #[test]
    fn missing_map_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        assert_eq!(update_file_map(dir.path(), today()).unwrap(), None);
    }

    #[test]
    fn counts_and_date_are_written_with_four_space_indent() {
        let dir = TempDir::new().unwrap();
        for name in ["a.md", "b.md", "a.html", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::write(
            dir.path().join("file_map.json"),
            r#"{"project_info":{"name":"Trading Project 002"},"statistics":{"by_type":{"json":1}},"files":[1,2]}"#,
        )
        .unwrap();

        let stats = update_file_map(dir.path(), today()).unwrap().unwrap();
        assert_eq!(stats, FileMapStats { html: 1, markdown: 2, total: 4 });

        let raw = std::fs::read_to_string(dir.path().join("file_map.json")).unwrap();
        assert!(raw.contains("\n    \"project_info\": {"), "got:\n{raw}");
        let doc: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["project_info"]["last_updated"], "2025-09-21");
        assert_eq!(doc["project_info"]["name"], "Trading Project 002");
        assert_eq!(doc["statistics"]["by_type"]["html"], 1);
        assert_eq!(doc["statistics"]["by_type"]["markdown"], 2);
        assert_eq!(doc["statistics"]["by_type"]["json"], 1);
        assert_eq!(doc["statistics"]["total_files"], 4);
        assert_eq!(doc["files"], serde_json::json!([1, 2]));
    }

    #[test]
    fn map_without_project_info_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("file_map.json"), r#"{"statistics":{}}"#).unwrap();
        let err = update_file_map(dir.path(), today()).unwrap_err();
        assert!(matches!(err, DocsError::FileMapShape { section: "project_info", .. }));
    }
}
