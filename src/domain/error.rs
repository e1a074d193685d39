use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Ingestion error: {document} - {message}")]
    Ingestion { document: String, message: String },

    #[error("Domain '{domain}' has no published index")]
    DomainNotIndexed { domain: String },

    #[error("Corrupt snapshot for domain '{domain}': {message}")]
    CorruptSnapshot { domain: String, message: String },

    #[error("Reindex of domain '{domain}' failed during {step}: {message}")]
    Reindex {
        domain: String,
        step: String,
        message: String,
    },

    #[error("Reindex already in progress for domain '{domain}'")]
    ReindexInProgress { domain: String },

    #[error("Generation backend error: {backend} - {message}")]
    GenerationBackend { backend: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(
        "Embedding model mismatch for domain '{domain}': index built with '{indexed}', live model is '{live}'"
    )]
    EmbeddingModelMismatch {
        domain: String,
        indexed: String,
        live: String,
    },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn ingestion(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingestion {
            document: document.into(),
            message: message.into(),
        }
    }

    pub fn domain_not_indexed(domain: impl Into<String>) -> Self {
        Self::DomainNotIndexed {
            domain: domain.into(),
        }
    }

    pub fn corrupt_snapshot(domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptSnapshot {
            domain: domain.into(),
            message: message.into(),
        }
    }

    pub fn reindex(
        domain: impl Into<String>,
        step: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Reindex {
            domain: domain.into(),
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn reindex_in_progress(domain: impl Into<String>) -> Self {
        Self::ReindexInProgress {
            domain: domain.into(),
        }
    }

    pub fn generation_backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GenerationBackend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn embedding_model_mismatch(
        domain: impl Into<String>,
        indexed: impl Into<String>,
        live: impl Into<String>,
    ) -> Self {
        Self::EmbeddingModelMismatch {
            domain: domain.into(),
            indexed: indexed.into(),
            live: live.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Stable taxonomy name of the error, suitable for logs and status mapping
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ingestion { .. } => "ingestion",
            Self::DomainNotIndexed { .. } => "domain_not_indexed",
            Self::CorruptSnapshot { .. } => "corrupt_snapshot",
            Self::Reindex { .. } => "reindex",
            Self::ReindexInProgress { .. } => "reindex_in_progress",
            Self::GenerationBackend { .. } => "generation_backend",
            Self::Configuration { .. } => "configuration",
            Self::EmbeddingModelMismatch { .. } => "embedding_model_mismatch",
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation",
            Self::Provider { .. } => "provider",
            Self::Storage { .. } => "storage",
        }
    }
}
