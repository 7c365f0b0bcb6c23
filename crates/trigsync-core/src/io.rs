use crate::error::{Result, TriggerError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting state files.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// Copy `source` to `dest` unless `dest` already exists. Returns true if copied.
///
/// An existing destination is never touched, so user edits survive re-runs.
pub fn copy_if_missing(source: &Path, dest: &Path) -> Result<bool> {
    if dest.exists() {
        return Ok(false);
    }
    if !source.is_file() {
        return Err(TriggerError::TemplateNotFound(source.to_path_buf()));
    }
    let data = std::fs::read(source)?;
    atomic_write(dest, &data)?;
    Ok(true)
}

/// Delete a generated module file. Any failure is reported as
/// [`TriggerError::ArtifactDeletion`].
pub fn remove_module(path: &Path) -> Result<()> {
    std::fs::remove_file(path).map_err(|source| TriggerError::ArtifactDeletion {
        path: path.to_path_buf(),
        source,
    })
}
