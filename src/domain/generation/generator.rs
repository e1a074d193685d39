use async_trait::async_trait;
use std::fmt::Debug;

use super::{GenerationRequest, GenerationResponse};
use crate::domain::DomainError;

/// Trait for hosted text-generation backends.
///
/// Implementations report every failure as `DomainError::GenerationBackend`
/// naming the backend; failures never come back as answer text.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Generate an answer for a single prompt
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, DomainError>;

    /// Get the backend name
    fn backend_name(&self) -> &'static str;

    /// Get the configured model
    fn model(&self) -> &str;
}
