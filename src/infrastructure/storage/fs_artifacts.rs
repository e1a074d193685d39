//! Filesystem-backed snapshot and index store
//!
//! Layout under `<data_dir>`:
//! - `snapshots/<domain>/v<version>.json`
//! - `indexes/<domain>/v<version>.json`
//! - `indexes/<domain>/current.json`, written last on publish

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::atomic::{io_error, read_optional, sync_directory, write_atomic};
use crate::domain::embedding::{EmbeddingSnapshot, SnapshotRepository};
use crate::domain::vector_index::{FlatIndex, IndexRepository};
use crate::domain::{DomainError, DomainName};

const CURRENT_POINTER: &str = "current.json";

#[derive(Debug, Serialize, Deserialize)]
struct CurrentPointer {
    version: u64,
}

#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    snapshots: PathBuf,
    indexes: PathBuf,
}

impl FsArtifactStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            snapshots: data_dir.join("snapshots"),
            indexes: data_dir.join("indexes"),
        }
    }

    fn snapshot_path(&self, domain: &DomainName, version: u64) -> PathBuf {
        self.snapshots
            .join(domain.as_str())
            .join(format!("v{}.json", version))
    }

    fn index_path(&self, domain: &DomainName, version: u64) -> PathBuf {
        self.indexes
            .join(domain.as_str())
            .join(format!("v{}.json", version))
    }

    fn pointer_path(&self, domain: &DomainName) -> PathBuf {
        self.indexes.join(domain.as_str()).join(CURRENT_POINTER)
    }
}

/// Delete `v<N>.json` files with `N < keep_from` from a domain directory
async fn prune_versions(dir: &Path, keep_from: u64) -> Result<usize, DomainError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(io_error("list", dir, e)),
    };

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| io_error("list", dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(version) = parse_version(&name) else {
            continue;
        };

        if version < keep_from {
            let path = entry.path();
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| io_error("remove", &path, e))?;
            removed += 1;
        }
    }

    if removed > 0 {
        sync_directory(dir).await?;
    }
    Ok(removed)
}

fn parse_version(file_name: &str) -> Option<u64> {
    file_name
        .strip_prefix('v')?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

fn to_json<T: Serialize>(value: &T, path: &Path) -> Result<Vec<u8>, DomainError> {
    serde_json::to_vec(value).map_err(|e| {
        DomainError::storage(format!("Failed to serialize {}: {}", path.display(), e))
    })
}

#[async_trait]
impl SnapshotRepository for FsArtifactStore {
    async fn save_snapshot(&self, snapshot: &EmbeddingSnapshot) -> Result<(), DomainError> {
        let path = self.snapshot_path(&snapshot.domain, snapshot.version);

        write_atomic(&path, &to_json(snapshot, &path)?).await?;

        debug!(
            domain = %snapshot.domain,
            version = snapshot.version,
            chunks = snapshot.len(),
            "Persisted embedding snapshot"
        );
        Ok(())
    }

    async fn load_snapshot(
        &self,
        domain: &DomainName,
        version: u64,
    ) -> Result<EmbeddingSnapshot, DomainError> {
        let path = self.snapshot_path(domain, version);

        let bytes = read_optional(&path).await?.ok_or_else(|| {
            DomainError::not_found(format!("Snapshot '{}' v{} not found", domain, version))
        })?;

        let snapshot: EmbeddingSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::corrupt_snapshot(
                domain.as_str(),
                format!("v{} is unreadable: {}", version, e),
            )
        })?;

        if &snapshot.domain != domain || snapshot.version != version {
            return Err(DomainError::corrupt_snapshot(
                domain.as_str(),
                format!(
                    "{} holds '{}' v{}",
                    path.display(),
                    snapshot.domain,
                    snapshot.version
                ),
            ));
        }

        snapshot.validate()?;
        Ok(snapshot)
    }

    async fn prune_snapshots(
        &self,
        domain: &DomainName,
        keep_from: u64,
    ) -> Result<usize, DomainError> {
        prune_versions(&self.snapshots.join(domain.as_str()), keep_from).await
    }
}

#[async_trait]
impl IndexRepository for FsArtifactStore {
    async fn save_index(&self, domain: &DomainName, index: &FlatIndex) -> Result<(), DomainError> {
        let path = self.index_path(domain, index.snapshot_version());

        write_atomic(&path, &to_json(index, &path)?).await?;

        debug!(
            domain = %domain,
            version = index.snapshot_version(),
            vectors = index.len(),
            "Persisted vector index"
        );
        Ok(())
    }

    async fn load_index(
        &self,
        domain: &DomainName,
        version: u64,
    ) -> Result<FlatIndex, DomainError> {
        let path = self.index_path(domain, version);

        let bytes = read_optional(&path).await?.ok_or_else(|| {
            DomainError::not_found(format!("Index '{}' v{} not found", domain, version))
        })?;

        let index: FlatIndex = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::corrupt_snapshot(
                domain.as_str(),
                format!("index v{} is unreadable: {}", version, e),
            )
        })?;

        if index.snapshot_version() != version || !index.is_consistent() {
            return Err(DomainError::corrupt_snapshot(
                domain.as_str(),
                format!("index file {} is inconsistent", path.display()),
            ));
        }

        Ok(index)
    }

    async fn prune_indexes(
        &self,
        domain: &DomainName,
        keep_from: u64,
    ) -> Result<usize, DomainError> {
        prune_versions(&self.indexes.join(domain.as_str()), keep_from).await
    }

    async fn publish(&self, domain: &DomainName, version: u64) -> Result<(), DomainError> {
        let path = self.pointer_path(domain);

        write_atomic(&path, &to_json(&CurrentPointer { version }, &path)?).await?;

        info!(domain = %domain, version = version, "Published index pointer");
        Ok(())
    }

    async fn current_version(&self, domain: &DomainName) -> Result<Option<u64>, DomainError> {
        let path = self.pointer_path(domain);

        let Some(bytes) = read_optional(&path).await? else {
            return Ok(None);
        };

        let pointer: CurrentPointer = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::corrupt_snapshot(
                domain.as_str(),
                format!("current pointer is unreadable: {}", e),
            )
        })?;

        Ok(Some(pointer.version))
    }

    async fn published_domains(&self) -> Result<Vec<DomainName>, DomainError> {
        let mut entries = match tokio::fs::read_dir(&self.indexes).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(io_error("list", &self.indexes, e)),
        };

        let mut domains = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list", &self.indexes, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Ok(domain) = DomainName::new(name) {
                if entry.path().join(CURRENT_POINTER).is_file() {
                    domains.push(domain);
                }
            }
        }

        domains.sort();
        Ok(domains)
    }
}
