//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Trait for embedding models (OpenAI-compatible endpoints, local servers, etc.)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate one embedding per input, in input order
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Get the configured model
    fn model(&self) -> &str;

    /// Get the embedding dimensions produced by the configured model
    fn dimensions(&self) -> usize;

    /// Version tag recorded in snapshots; vectors from different tags are not comparable
    fn model_version(&self) -> String {
        format!(
            "{}/{}@{}",
            self.provider_name(),
            self.model(),
            self.dimensions()
        )
    }
}
