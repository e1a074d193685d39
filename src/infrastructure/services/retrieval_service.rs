//! Retrieval service - k nearest chunks of a domain for a query

use std::sync::Arc;

use tracing::debug;

use super::catalog::IndexCatalog;
use super::embedding_store::EmbeddingStore;
use crate::domain::{DomainError, DomainName, SearchHit, SearchResult};

pub struct RetrievalService {
    store: Arc<EmbeddingStore>,
    catalog: Arc<IndexCatalog>,
}

impl std::fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("store", &self.store)
            .finish()
    }
}

impl RetrievalService {
    pub fn new(store: Arc<EmbeddingStore>, catalog: Arc<IndexCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Up to `top_k` chunks of `domain` closest to `query`, ascending by distance
    pub async fn search(
        &self,
        query: &str,
        domain: &DomainName,
        top_k: usize,
    ) -> Result<SearchResult, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("Query cannot be empty"));
        }

        let published = self.catalog.get(domain).await?;
        let snapshot = published.snapshot();

        let live = self.store.model_version();
        if snapshot.model_version != live {
            return Err(DomainError::embedding_model_mismatch(
                domain.as_str(),
                snapshot.model_version.clone(),
                live,
            ));
        }

        if top_k == 0 {
            return Ok(SearchResult {
                domain: domain.clone(),
                snapshot_version: published.version(),
                hits: Vec::new(),
            });
        }

        let query_vector = self.store.embed_query(query).await?;
        let neighbors = published.index().search(&query_vector, top_k)?;

        let hits: Vec<SearchHit> = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                snapshot.chunks.get(neighbor.position).map(|chunk| SearchHit {
                    text: chunk.text.clone(),
                    distance: neighbor.distance,
                    document: chunk.document.clone(),
                    ordinal: chunk.ordinal,
                })
            })
            .collect();

        debug!(
            domain = %domain,
            version = published.version(),
            top_k = top_k,
            hits = hits.len(),
            "Retrieved chunks"
        );

        Ok(SearchResult {
            domain: domain.clone(),
            snapshot_version: published.version(),
            hits,
        })
    }
}
