//! Usage: Crash-safe file replacement (temp file + backup + rename).

use crate::shared::error::OperationResult;
use std::path::Path;

pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> OperationResult<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("STORAGE_ERROR: invalid file path: {}", path.display()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("STORAGE_ERROR: failed to create {}: {e}", parent.display()))?;
        }
    }

    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));
    let backup_path = path.with_file_name(format!("{file_name}.bak"));

    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("STORAGE_ERROR: failed to write temp file for {file_name}: {e}"))?;

    if backup_path.exists() {
        let _ = std::fs::remove_file(&backup_path);
    }

    if path.exists() {
        std::fs::rename(path, &backup_path)
            .map_err(|e| format!("STORAGE_ERROR: failed to create {file_name} backup: {e}"))?;
    }

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::rename(&backup_path, path);
        return Err(format!("STORAGE_ERROR: failed to finalize {file_name}: {e}").into());
    }

    if backup_path.exists() {
        let _ = std::fs::remove_file(&backup_path);
    }

    Ok(())
}
