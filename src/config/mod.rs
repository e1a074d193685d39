mod app_config;

pub use app_config::{
    AppConfig, ChunkingSettings, EmbeddingConfig, GenerationBackendKind, GenerationConfig,
    LogFormat, LoggingConfig, RetrievalConfig, StorageConfig,
};
