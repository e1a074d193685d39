//! Vector index repository trait

use async_trait::async_trait;

use super::FlatIndex;
use crate::domain::{DomainError, DomainName};

/// Repository for versioned indexes and the per-domain published pointer
#[async_trait]
pub trait IndexRepository: Send + Sync {
    /// Durably stores an index under its snapshot version
    async fn save_index(&self, domain: &DomainName, index: &FlatIndex) -> Result<(), DomainError>;

    /// Loads an index; `NotFound` if the version was never stored
    async fn load_index(
        &self,
        domain: &DomainName,
        version: u64,
    ) -> Result<FlatIndex, DomainError>;

    /// Removes the domain's indexes older than `keep_from`, returning how many went
    async fn prune_indexes(
        &self,
        domain: &DomainName,
        keep_from: u64,
    ) -> Result<usize, DomainError>;

    /// Points the domain's current slot at `version`
    async fn publish(&self, domain: &DomainName, version: u64) -> Result<(), DomainError>;

    /// The published version of a domain, if any
    async fn current_version(&self, domain: &DomainName) -> Result<Option<u64>, DomainError>;

    /// Every domain with a published version
    async fn published_domains(&self) -> Result<Vec<DomainName>, DomainError>;
}

/// In-memory implementation of IndexRepository
pub mod in_memory {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct InMemoryIndexRepository {
        indexes: RwLock<HashMap<(DomainName, u64), FlatIndex>>,
        current: RwLock<BTreeMap<DomainName, u64>>,
    }

    impl InMemoryIndexRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl IndexRepository for InMemoryIndexRepository {
        async fn save_index(
            &self,
            domain: &DomainName,
            index: &FlatIndex,
        ) -> Result<(), DomainError> {
            let mut indexes = self
                .indexes
                .write()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            indexes.insert((domain.clone(), index.snapshot_version()), index.clone());
            Ok(())
        }

        async fn load_index(
            &self,
            domain: &DomainName,
            version: u64,
        ) -> Result<FlatIndex, DomainError> {
            let indexes = self
                .indexes
                .read()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            indexes
                .get(&(domain.clone(), version))
                .cloned()
                .ok_or_else(|| {
                    DomainError::not_found(format!("Index '{}' v{} not found", domain, version))
                })
        }

        async fn prune_indexes(
            &self,
            domain: &DomainName,
            keep_from: u64,
        ) -> Result<usize, DomainError> {
            let mut indexes = self
                .indexes
                .write()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            let before = indexes.len();
            indexes.retain(|(d, version), _| d != domain || *version >= keep_from);
            Ok(before - indexes.len())
        }

        async fn publish(&self, domain: &DomainName, version: u64) -> Result<(), DomainError> {
            let mut current = self
                .current
                .write()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            current.insert(domain.clone(), version);
            Ok(())
        }

        async fn current_version(&self, domain: &DomainName) -> Result<Option<u64>, DomainError> {
            let current = self
                .current
                .read()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            Ok(current.get(domain).copied())
        }

        async fn published_domains(&self) -> Result<Vec<DomainName>, DomainError> {
            let current = self
                .current
                .read()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            Ok(current.keys().cloned().collect())
        }
    }

}
