//! Index catalog - the per-domain current (snapshot, index) pair
//!
//! Readers clone an `Arc` out of the map and release the lock at once; a
//! rebuild only takes the write lock to swap the pointer.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::embedding::{EmbeddingSnapshot, SnapshotRepository};
use crate::domain::vector_index::{FlatIndex, IndexRepository};
use crate::domain::{DomainError, DomainName};

/// A snapshot and the index built from it, verified to belong together
#[derive(Debug)]
pub struct PublishedIndex {
    snapshot: EmbeddingSnapshot,
    index: FlatIndex,
}

impl PublishedIndex {
    pub fn new(snapshot: EmbeddingSnapshot, index: FlatIndex) -> Result<Self, DomainError> {
        if index.snapshot_version() != snapshot.version {
            return Err(DomainError::corrupt_snapshot(
                snapshot.domain.as_str(),
                format!(
                    "index built from v{} paired with snapshot v{}",
                    index.snapshot_version(),
                    snapshot.version
                ),
            ));
        }

        if index.len() != snapshot.len() || index.dimensions() != snapshot.dimensions {
            return Err(DomainError::corrupt_snapshot(
                snapshot.domain.as_str(),
                format!(
                    "v{} index holds {}x{} vectors, snapshot {}x{}",
                    snapshot.version,
                    index.len(),
                    index.dimensions(),
                    snapshot.len(),
                    snapshot.dimensions
                ),
            ));
        }

        Ok(Self { snapshot, index })
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    pub fn snapshot(&self) -> &EmbeddingSnapshot {
        &self.snapshot
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }
}

pub struct IndexCatalog {
    snapshots: Arc<dyn SnapshotRepository>,
    indexes: Arc<dyn IndexRepository>,
    current: RwLock<HashMap<DomainName, Arc<PublishedIndex>>>,
}

impl std::fmt::Debug for IndexCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCatalog").finish()
    }
}

impl IndexCatalog {
    pub fn new(
        snapshots: Arc<dyn SnapshotRepository>,
        indexes: Arc<dyn IndexRepository>,
    ) -> Self {
        Self {
            snapshots,
            indexes,
            current: RwLock::new(HashMap::new()),
        }
    }

    /// Current pair for a domain, loading it from storage on first access
    pub async fn get(&self, domain: &DomainName) -> Result<Arc<PublishedIndex>, DomainError> {
        if let Some(published) = self.current.read().await.get(domain).cloned() {
            return Ok(published);
        }

        let version = self
            .indexes
            .current_version(domain)
            .await?
            .ok_or_else(|| DomainError::domain_not_indexed(domain.as_str()))?;

        let loaded = match self.load_pair(domain, version).await {
            Ok(pair) => Arc::new(pair),
            Err(e) => {
                // A concurrent publish may have pruned the version read above
                if let Some(published) = self.current.read().await.get(domain).cloned() {
                    return Ok(published);
                }
                return Err(e);
            }
        };

        let mut current = self.current.write().await;
        // A concurrent publish may already hold a newer pair
        let entry = current
            .entry(domain.clone())
            .and_modify(|existing| {
                if existing.version() < loaded.version() {
                    *existing = loaded.clone();
                }
            })
            .or_insert_with(|| loaded.clone());

        debug!(domain = %domain, version = entry.version(), "Loaded published index");
        Ok(entry.clone())
    }

    async fn load_pair(
        &self,
        domain: &DomainName,
        version: u64,
    ) -> Result<PublishedIndex, DomainError> {
        let missing = |e: DomainError| match e {
            DomainError::NotFound { message } => {
                DomainError::corrupt_snapshot(domain.as_str(), message)
            }
            other => other,
        };

        let snapshot = self
            .snapshots
            .load_snapshot(domain, version)
            .await
            .map_err(missing)?;
        let index = self
            .indexes
            .load_index(domain, version)
            .await
            .map_err(missing)?;

        PublishedIndex::new(snapshot, index)
    }

    /// Persist the index, move the durable pointer, swap the in-memory pair,
    /// then drop superseded versions from storage
    pub async fn publish(
        &self,
        domain: &DomainName,
        published: PublishedIndex,
    ) -> Result<Arc<PublishedIndex>, DomainError> {
        let published = Arc::new(published);

        self.indexes.save_index(domain, published.index()).await?;
        self.indexes.publish(domain, published.version()).await?;

        self.current
            .write()
            .await
            .insert(domain.clone(), published.clone());

        info!(
            domain = %domain,
            version = published.version(),
            chunks = published.snapshot().len(),
            "Swapped current index"
        );

        self.prune(domain, published.version()).await;
        Ok(published)
    }

    /// Best effort; a leftover version is only wasted space
    async fn prune(&self, domain: &DomainName, keep_from: u64) {
        match self.snapshots.prune_snapshots(domain, keep_from).await {
            Ok(0) => {}
            Ok(removed) => debug!(domain = %domain, removed = removed, "Pruned old snapshots"),
            Err(e) => warn!(domain = %domain, error = %e, "Failed to prune old snapshots"),
        }

        match self.indexes.prune_indexes(domain, keep_from).await {
            Ok(0) => {}
            Ok(removed) => debug!(domain = %domain, removed = removed, "Pruned old indexes"),
            Err(e) => warn!(domain = %domain, error = %e, "Failed to prune old indexes"),
        }
    }

    /// Version of the published pair, if any
    pub async fn current_version(&self, domain: &DomainName) -> Result<Option<u64>, DomainError> {
        if let Some(published) = self.current.read().await.get(domain) {
            return Ok(Some(published.version()));
        }

        self.indexes.current_version(domain).await
    }

    pub async fn published_domains(&self) -> Result<Vec<DomainName>, DomainError> {
        let mut domains = self.indexes.published_domains().await?;
        domains.extend(self.current.read().await.keys().cloned());
        domains.sort();
        domains.dedup();
        Ok(domains)
    }

    /// Load and verify every published pair; fails on the first corrupt one
    pub async fn warm(&self) -> Result<usize, DomainError> {
        let domains = self.indexes.published_domains().await?;

        for domain in &domains {
            self.get(domain).await?;
        }

        Ok(domains.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::InMemorySnapshotRepository;
    use crate::domain::ingestion::Chunk;
    use crate::domain::vector_index::InMemoryIndexRepository;

    fn law() -> DomainName {
        DomainName::new("law").unwrap()
    }

    fn pair(version: u64, texts: &[&str]) -> (EmbeddingSnapshot, FlatIndex) {
        let vectors: Vec<Vec<f32>> = (0..texts.len()).map(|i| vec![i as f32, 0.0]).collect();
        let chunks = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(law(), "doc.txt", i, *t))
            .collect();
        let snapshot =
            EmbeddingSnapshot::new(law(), version, "mock/mock-embedding@2", 2, chunks, vectors.clone())
                .unwrap();
        let index = FlatIndex::build(version, 2, &vectors).unwrap();
        (snapshot, index)
    }

    fn catalog() -> (
        IndexCatalog,
        Arc<InMemorySnapshotRepository>,
        Arc<InMemoryIndexRepository>,
    ) {
        let snapshots = Arc::new(InMemorySnapshotRepository::new());
        let indexes = Arc::new(InMemoryIndexRepository::new());
        (
            IndexCatalog::new(snapshots.clone(), indexes.clone()),
            snapshots,
            indexes,
        )
    }

    #[test]
    fn test_pair_version_mismatch_is_corrupt() {
        let (snapshot, _) = pair(1, &["a."]);
        let (_, index) = pair(2, &["a."]);

        let result = PublishedIndex::new(snapshot, index);
        assert!(matches!(result, Err(DomainError::CorruptSnapshot { .. })));
    }

    #[test]
    fn test_pair_count_mismatch_is_corrupt() {
        let (snapshot, _) = pair(1, &["a.", "b."]);
        let (_, index) = pair(1, &["a."]);

        let result = PublishedIndex::new(snapshot, index);
        assert!(matches!(result, Err(DomainError::CorruptSnapshot { .. })));
    }

    #[tokio::test]
    async fn test_unpublished_domain_not_indexed() {
        let (catalog, _, _) = catalog();

        let result = catalog.get(&law()).await;
        assert!(matches!(result, Err(DomainError::DomainNotIndexed { .. })));
    }

    #[tokio::test]
    async fn test_publish_then_get() {
        let (catalog, snapshots, indexes) = catalog();
        let (snapshot, index) = pair(1, &["a.", "b."]);
        snapshots.save_snapshot(&snapshot).await.unwrap();

        catalog
            .publish(&law(), PublishedIndex::new(snapshot, index).unwrap())
            .await
            .unwrap();

        assert_eq!(indexes.current_version(&law()).await.unwrap(), Some(1));
        assert_eq!(catalog.get(&law()).await.unwrap().version(), 1);
        assert_eq!(catalog.current_version(&law()).await.unwrap(), Some(1));
        assert_eq!(catalog.published_domains().await.unwrap(), vec![law()]);
    }

    #[tokio::test]
    async fn test_lazy_load_from_storage() {
        let (_, snapshots, indexes) = catalog();
        let (snapshot, index) = pair(2, &["a.", "b."]);
        snapshots.save_snapshot(&snapshot).await.unwrap();
        indexes.save_index(&law(), &index).await.unwrap();
        indexes.publish(&law(), 2).await.unwrap();

        let fresh = IndexCatalog::new(snapshots, indexes);

        assert_eq!(fresh.warm().await.unwrap(), 1);
        let published = fresh.get(&law()).await.unwrap();
        assert_eq!(published.version(), 2);
        assert_eq!(published.snapshot().texts(), vec!["a.", "b."]);
    }

    #[tokio::test]
    async fn test_pointer_without_artifacts_is_corrupt() {
        let (catalog, _, indexes) = catalog();
        indexes.publish(&law(), 5).await.unwrap();

        let result = catalog.get(&law()).await;
        assert!(matches!(result, Err(DomainError::CorruptSnapshot { .. })));
    }

    #[tokio::test]
    async fn test_readers_keep_old_pair_across_swap() {
        let (catalog, _, _) = catalog();
        let (s1, i1) = pair(1, &["old."]);
        let (s2, i2) = pair(2, &["new.", "newer."]);

        catalog
            .publish(&law(), PublishedIndex::new(s1, i1).unwrap())
            .await
            .unwrap();
        let held = catalog.get(&law()).await.unwrap();

        catalog
            .publish(&law(), PublishedIndex::new(s2, i2).unwrap())
            .await
            .unwrap();

        assert_eq!(held.version(), 1);
        assert_eq!(held.snapshot().texts(), vec!["old."]);
        assert_eq!(catalog.get(&law()).await.unwrap().version(), 2);
    }

    #[tokio::test]
    async fn test_publish_prunes_superseded_versions() {
        let (catalog, snapshots, indexes) = catalog();

        for version in 1..=3 {
            let (snapshot, index) = pair(version, &["a."]);
            snapshots.save_snapshot(&snapshot).await.unwrap();
            catalog
                .publish(&law(), PublishedIndex::new(snapshot, index).unwrap())
                .await
                .unwrap();
        }

        assert!(matches!(
            snapshots.load_snapshot(&law(), 2).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            indexes.load_index(&law(), 1).await,
            Err(DomainError::NotFound { .. })
        ));

        let fresh = IndexCatalog::new(snapshots, indexes);
        assert_eq!(fresh.get(&law()).await.unwrap().version(), 3);
    }
}
