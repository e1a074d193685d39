//! Versioned embedding snapshots
//!
//! A snapshot binds a domain's ordered chunk texts to their vectors. Position
//! `i` in `chunks` is embedded by position `i` in `vectors`; the pair is only
//! ever stored and loaded as one unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::ingestion::Chunk;
use crate::domain::{DomainError, DomainName};

/// Chunk provenance stored alongside its vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub document: String,
    pub ordinal: usize,
    pub text: String,
}

impl From<Chunk> for ChunkRecord {
    fn from(chunk: Chunk) -> Self {
        Self {
            document: chunk.document,
            ordinal: chunk.ordinal,
            text: chunk.text,
        }
    }
}

/// Immutable, versioned embedding store contents for one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSnapshot {
    pub domain: DomainName,
    pub version: u64,
    pub model_version: String,
    pub dimensions: usize,
    pub created_at: DateTime<Utc>,
    /// SHA-256 over the ordered chunk texts
    pub fingerprint: String,
    pub chunks: Vec<ChunkRecord>,
    pub vectors: Vec<Vec<f32>>,
}

impl EmbeddingSnapshot {
    /// Assemble a snapshot, rejecting misaligned input
    pub fn new(
        domain: DomainName,
        version: u64,
        model_version: impl Into<String>,
        dimensions: usize,
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, DomainError> {
        let chunks: Vec<ChunkRecord> = chunks.into_iter().map(ChunkRecord::from).collect();
        let fingerprint = fingerprint(&chunks);

        let snapshot = Self {
            domain,
            version,
            model_version: model_version.into(),
            dimensions,
            created_at: Utc::now(),
            fingerprint,
            chunks,
            vectors,
        };

        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check positional alignment, vector dimensions and the text fingerprint
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunks.len() != self.vectors.len() {
            return Err(DomainError::corrupt_snapshot(
                self.domain.as_str(),
                format!(
                    "v{} has {} chunks but {} vectors",
                    self.version,
                    self.chunks.len(),
                    self.vectors.len()
                ),
            ));
        }

        if let Some(position) = self
            .vectors
            .iter()
            .position(|v| v.len() != self.dimensions)
        {
            return Err(DomainError::corrupt_snapshot(
                self.domain.as_str(),
                format!(
                    "v{} vector {} has dimension {}, expected {}",
                    self.version,
                    position,
                    self.vectors[position].len(),
                    self.dimensions
                ),
            ));
        }

        if fingerprint(&self.chunks) != self.fingerprint {
            return Err(DomainError::corrupt_snapshot(
                self.domain.as_str(),
                format!("v{} chunk texts do not match fingerprint", self.version),
            ));
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }
}

fn fingerprint(chunks: &[ChunkRecord]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.text.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Repository for versioned embedding snapshots
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Durably stores a snapshot under its version
    async fn save_snapshot(&self, snapshot: &EmbeddingSnapshot) -> Result<(), DomainError>;

    /// Loads and validates a snapshot; `NotFound` if the version was never stored
    async fn load_snapshot(
        &self,
        domain: &DomainName,
        version: u64,
    ) -> Result<EmbeddingSnapshot, DomainError>;

    /// Removes the domain's snapshots older than `keep_from`, returning how many went
    async fn prune_snapshots(
        &self,
        domain: &DomainName,
        keep_from: u64,
    ) -> Result<usize, DomainError>;
}

/// In-memory implementation of SnapshotRepository
pub mod in_memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct InMemorySnapshotRepository {
        snapshots: RwLock<HashMap<(DomainName, u64), EmbeddingSnapshot>>,
    }

    impl InMemorySnapshotRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl SnapshotRepository for InMemorySnapshotRepository {
        async fn save_snapshot(&self, snapshot: &EmbeddingSnapshot) -> Result<(), DomainError> {
            let mut snapshots = self
                .snapshots
                .write()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            snapshots.insert(
                (snapshot.domain.clone(), snapshot.version),
                snapshot.clone(),
            );
            Ok(())
        }

        async fn load_snapshot(
            &self,
            domain: &DomainName,
            version: u64,
        ) -> Result<EmbeddingSnapshot, DomainError> {
            let snapshots = self
                .snapshots
                .read()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            let snapshot = snapshots
                .get(&(domain.clone(), version))
                .cloned()
                .ok_or_else(|| {
                    DomainError::not_found(format!("Snapshot '{}' v{} not found", domain, version))
                })?;

            snapshot.validate()?;
            Ok(snapshot)
        }

        async fn prune_snapshots(
            &self,
            domain: &DomainName,
            keep_from: u64,
        ) -> Result<usize, DomainError> {
            let mut snapshots = self
                .snapshots
                .write()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            let before = snapshots.len();
            snapshots.retain(|(d, version), _| d != domain || *version >= keep_from);
            Ok(before - snapshots.len())
        }
    }
}
