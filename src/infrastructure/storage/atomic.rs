//! Crash-safe file writes

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::DomainError;

const TEMPORARY_PREFIX: &str = ".tmp-";

/// Write `bytes` to a hidden temporary sibling of `path`, flush it to disk,
/// rename it over `path`, then flush the directory.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    let parent = path
        .parent()
        .ok_or_else(|| DomainError::storage(format!("No parent directory for {}", path.display())))?;

    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| io_error("create directory", parent, e))?;

    let tmp = temporary_path(path);

    let result = async {
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| io_error("create", &tmp, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| io_error("write", &tmp, e))?;
        file.sync_all()
            .await
            .map_err(|e| io_error("flush", &tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| io_error("rename", path, e))?;

        // The rename is only durable once the directory entry is
        sync_directory(parent).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }

    result
}

/// Read a file, mapping a missing file to `None`
pub(crate) async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, DomainError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("read", path, e)),
    }
}

/// Flush a directory's entries to disk
#[cfg(unix)]
pub(crate) async fn sync_directory(dir: &Path) -> Result<(), DomainError> {
    let owned = dir.to_path_buf();

    tokio::task::spawn_blocking(move || std::fs::File::open(&owned)?.sync_all())
        .await
        .map_err(|e| DomainError::storage(format!("Directory sync aborted: {}", e)))?
        .map_err(|e| io_error("sync directory", dir, e))
}

/// Directories cannot be opened for syncing on this platform
#[cfg(not(unix))]
pub(crate) async fn sync_directory(_dir: &Path) -> Result<(), DomainError> {
    Ok(())
}

/// Whether a directory entry is a leftover temporary file
pub(crate) fn is_temporary(name: &str) -> bool {
    name.starts_with(TEMPORARY_PREFIX)
}

pub(crate) fn io_error(action: &str, path: &Path, err: std::io::Error) -> DomainError {
    DomainError::storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Fixed-length name so any valid target name leaves room for it
fn temporary_path(path: &Path) -> PathBuf {
    path.with_file_name(format!("{}{}", TEMPORARY_PREFIX, Uuid::new_v4()))
}
