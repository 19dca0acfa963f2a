//! Atomic text writes: `<name>.tmp` sibling, then rename over the target.

use std::path::{Path, PathBuf};

use crate::error::{io_err, DocsError};

/// Write `content` to `path` with LF line endings, creating the parent
/// directory when missing. The temporary file is removed if the rename fails.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), DocsError> {
    let normalized = content.replace("\r\n", "\n");

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = tmp_sibling(path);
    std::fs::write(&tmp, normalized).map_err(|e| io_err(&tmp, e))?;

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    tracing::debug!("wrote: {}", path.display());
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.tmp"))
}
