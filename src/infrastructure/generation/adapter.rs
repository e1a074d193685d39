use async_trait::async_trait;
use std::time::Duration;

use super::gemini::{GeminiGenerator, DEFAULT_GEMINI_MODEL};
use super::http_client::{HttpClient, HttpClientTrait};
use super::openai::{OpenAiGenerator, DEFAULT_OPENAI_MODEL};
use crate::config::{GenerationBackendKind, GenerationConfig};
use crate::domain::{DomainError, GenerationRequest, GenerationResponse, TextGenerator};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Closed set of generation backends, selected once from configuration
#[derive(Debug)]
pub enum GenerationAdapter<C: HttpClientTrait = HttpClient> {
    OpenAi(OpenAiGenerator<C>),
    Gemini(GeminiGenerator<C>),
}

#[async_trait]
impl<C: HttpClientTrait> TextGenerator for GenerationAdapter<C> {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, DomainError> {
        match self {
            Self::OpenAi(backend) => backend.generate(request).await,
            Self::Gemini(backend) => backend.generate(request).await,
        }
    }

    fn backend_name(&self) -> &'static str {
        match self {
            Self::OpenAi(backend) => backend.backend_name(),
            Self::Gemini(backend) => backend.backend_name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::OpenAi(backend) => backend.model(),
            Self::Gemini(backend) => backend.model(),
        }
    }
}

/// Factory for creating the generation adapter
#[derive(Debug)]
pub struct GenerationAdapterFactory;

impl GenerationAdapterFactory {
    /// Create the adapter from configuration, reading API keys from the environment
    pub fn create(config: &GenerationConfig) -> Result<GenerationAdapter, DomainError> {
        let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs.max(1)))?;
        Self::create_with_client(config, client, |name| std::env::var(name).ok())
    }

    /// Create the adapter with an explicit client and key lookup
    pub fn create_with_client<C: HttpClientTrait>(
        config: &GenerationConfig,
        client: C,
        lookup_key: impl Fn(&str) -> Option<String>,
    ) -> Result<GenerationAdapter<C>, DomainError> {
        let lookup = |name: &str| lookup_key(name).filter(|key| !key.trim().is_empty());

        let (kind, api_key) = match config.backend {
            Some(kind) => {
                let env = key_env(kind);
                let key = lookup(env).ok_or_else(|| {
                    DomainError::configuration(format!(
                        "Generation backend '{}' requires {} to be set",
                        backend_label(kind),
                        env
                    ))
                })?;
                (kind, key)
            }
            None => Self::detect(&lookup)?,
        };

        let adapter = match kind {
            GenerationBackendKind::OpenAi => {
                let model = config.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
                GenerationAdapter::OpenAi(match config.base_url {
                    Some(ref base_url) => {
                        OpenAiGenerator::with_base_url(client, api_key, model, base_url)
                    }
                    None => OpenAiGenerator::new(client, api_key, model),
                })
            }
            GenerationBackendKind::Gemini => {
                let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
                GenerationAdapter::Gemini(match config.base_url {
                    Some(ref base_url) => {
                        GeminiGenerator::with_base_url(client, api_key, model, base_url)
                    }
                    None => GeminiGenerator::new(client, api_key, model),
                })
            }
        };

        tracing::info!(
            backend = adapter.backend_name(),
            model = adapter.model(),
            "Generation backend selected"
        );

        Ok(adapter)
    }

    /// Gemini wins when both keys are present
    fn detect(
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<(GenerationBackendKind, String), DomainError> {
        if let Some(key) = lookup(GEMINI_API_KEY_ENV) {
            return Ok((GenerationBackendKind::Gemini, key));
        }

        if let Some(key) = lookup(OPENAI_API_KEY_ENV) {
            return Ok((GenerationBackendKind::OpenAi, key));
        }

        Err(DomainError::configuration(format!(
            "No generation backend configured: set generation.backend or one of {}, {}",
            GEMINI_API_KEY_ENV, OPENAI_API_KEY_ENV
        )))
    }
}

fn key_env(kind: GenerationBackendKind) -> &'static str {
    match kind {
        GenerationBackendKind::OpenAi => OPENAI_API_KEY_ENV,
        GenerationBackendKind::Gemini => GEMINI_API_KEY_ENV,
    }
}

fn backend_label(kind: GenerationBackendKind) -> &'static str {
    match kind {
        GenerationBackendKind::OpenAi => "openai",
        GenerationBackendKind::Gemini => "gemini",
    }
}
