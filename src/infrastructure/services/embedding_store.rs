//! Embedding store - turns chunks into versioned snapshots and persists them

use std::sync::Arc;

use tracing::debug;

use crate::domain::embedding::{
    EmbeddingProvider, EmbeddingRequest, EmbeddingSnapshot, SnapshotRepository,
};
use crate::domain::ingestion::Chunk;
use crate::domain::vector_index::IndexRepository;
use crate::domain::{DomainError, DomainName};

/// Default number of texts per embedding request
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;

pub struct EmbeddingStore {
    provider: Arc<dyn EmbeddingProvider>,
    snapshots: Arc<dyn SnapshotRepository>,
    indexes: Arc<dyn IndexRepository>,
    batch_size: usize,
}

impl std::fmt::Debug for EmbeddingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingStore")
            .field("model_version", &self.provider.model_version())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl EmbeddingStore {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        snapshots: Arc<dyn SnapshotRepository>,
        indexes: Arc<dyn IndexRepository>,
    ) -> Self {
        Self {
            provider,
            snapshots,
            indexes,
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Version tag of the live embedding model
    pub fn model_version(&self) -> String {
        self.provider.model_version()
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    /// Embed texts in order, batch by batch
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let request = EmbeddingRequest::batch(self.provider.model(), batch.to_vec());
            let response = self.provider.embed(request).await?;
            vectors.extend(response.into_ordered_vectors(batch.len(), self.provider.dimensions())?);
        }

        Ok(vectors)
    }

    /// Embed a single query text
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(self.provider.model(), query);
        let response = self.provider.embed(request).await?;

        response
            .into_ordered_vectors(1, self.provider.dimensions())?
            .pop()
            .ok_or_else(|| DomainError::provider(self.provider.provider_name(), "No embedding returned"))
    }

    /// Embed a domain's chunks into a snapshot with the given version
    pub async fn build(
        &self,
        domain: &DomainName,
        version: u64,
        chunks: Vec<Chunk>,
    ) -> Result<EmbeddingSnapshot, DomainError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embed_texts(&texts).await?;

        debug!(
            domain = %domain,
            version = version,
            chunks = texts.len(),
            batches = texts.len().div_ceil(self.batch_size),
            "Embedded domain corpus"
        );

        EmbeddingSnapshot::new(
            domain.clone(),
            version,
            self.provider.model_version(),
            self.provider.dimensions(),
            chunks,
            vectors,
        )
    }

    pub async fn persist(&self, snapshot: &EmbeddingSnapshot) -> Result<(), DomainError> {
        self.snapshots.save_snapshot(snapshot).await
    }

    /// Load the snapshot behind the domain's published index
    pub async fn load(&self, domain: &DomainName) -> Result<EmbeddingSnapshot, DomainError> {
        let version = self.indexes.current_version(domain).await?.ok_or_else(|| {
            DomainError::not_found(format!("Domain '{}' has never been indexed", domain))
        })?;

        self.snapshots.load_snapshot(domain, version).await
    }
}
