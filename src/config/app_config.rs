use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for documents, snapshots and indexes
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub max_words: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// OpenAI-compatible server root (the `/v1/embeddings` path is appended)
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
    /// Environment variable holding the API key; unset means no auth header
    pub api_key_env: String,
    /// Per-request timeout of the embedding HTTP client
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Supported generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackendKind {
    OpenAi,
    Gemini,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Backend to use; detected from the available API keys when unset
    pub backend: Option<GenerationBackendKind>,
    /// Model override; each backend has its own default
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_top_k: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { max_words: 200 }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 64,
            api_key_env: "EMBEDDING_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: None,
            model: None,
            base_url: None,
            max_tokens: Some(500),
            temperature: None,
            timeout_secs: 60,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_top_k: 5 }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("RAG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.chunking.max_words, 200);
        assert_eq!(config.embedding.dimensions, 384);
        assert_eq!(config.embedding.batch_size, 64);
        assert_eq!(config.generation.timeout_secs, 60);
        assert_eq!(config.embedding.timeout(), Duration::from_secs(30));
        assert_eq!(config.generation.backend, None);
        assert_eq!(config.retrieval.default_top_k, 5);
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("generation.backend", "gemini")
            .unwrap()
            .set_override("retrieval.default_top_k", 3)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            config.generation.backend,
            Some(GenerationBackendKind::Gemini)
        );
        assert_eq!(config.generation.timeout_secs, 60);
        assert_eq!(config.retrieval.default_top_k, 3);
        assert_eq!(config.embedding.model, "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_embedding_timeout_independent_of_generation() {
        let config: AppConfig = config::Config::builder()
            .set_override("generation.timeout_secs", 120)
            .unwrap()
            .set_override("embedding.timeout_secs", 5)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.embedding.timeout(), Duration::from_secs(5));
        assert_eq!(config.generation.timeout_secs, 120);
    }
}
