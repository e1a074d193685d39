//! RAG service - retrieval-augmented answers

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::retrieval_service::RetrievalService;
use crate::domain::{DomainError, DomainName, GenerationRequest, TextGenerator};

/// Default deadline for one generation call
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the generation prompt from retrieved context and the user query
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Use the following context to answer the question:\n{}\n\nQuestion: {}\nAnswer:",
        context, query
    )
}

/// Generation parameters applied to every answer
#[derive(Debug, Clone)]
pub struct RagSettings {
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GENERATION_TIMEOUT,
            max_tokens: Some(500),
            temperature: None,
        }
    }
}

pub struct RagService {
    retrieval: Arc<RetrievalService>,
    generator: Arc<dyn TextGenerator>,
    settings: RagSettings,
}

impl std::fmt::Debug for RagService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagService")
            .field("backend", &self.generator.backend_name())
            .field("model", &self.generator.model())
            .field("settings", &self.settings)
            .finish()
    }
}

impl RagService {
    pub fn new(
        retrieval: Arc<RetrievalService>,
        generator: Arc<dyn TextGenerator>,
        settings: RagSettings,
    ) -> Self {
        Self {
            retrieval,
            generator,
            settings,
        }
    }

    /// Answer `query` from the `top_k` most relevant chunks of `domain`
    pub async fn answer(
        &self,
        query: &str,
        domain: &DomainName,
        top_k: usize,
    ) -> Result<String, DomainError> {
        let retrieved = self.retrieval.search(query, domain, top_k).await?;

        if retrieved.is_empty() {
            warn!(domain = %domain, "No context retrieved, answering without it");
        }

        let context = retrieved.texts().join("\n");
        let mut request = GenerationRequest::new(build_prompt(&context, query));
        if let Some(max_tokens) = self.settings.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.settings.temperature {
            request = request.with_temperature(temperature);
        }

        let backend = self.generator.backend_name();
        let response = tokio::time::timeout(self.settings.timeout, self.generator.generate(request))
            .await
            .map_err(|_| {
                DomainError::generation_backend(
                    backend,
                    format!("Timed out after {:?}", self.settings.timeout),
                )
            })??;

        info!(
            domain = %domain,
            backend = backend,
            model = %response.model,
            chunks = retrieved.len(),
            "Generated answer"
        );

        Ok(response.text)
    }
}
