//! `RagEngine` - the facade a request layer talks to

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::embedding::{EmbeddingProvider, SnapshotRepository};
use crate::domain::ingestion::{ChunkingConfig, DocumentRepository};
use crate::domain::vector_index::IndexRepository;
use crate::domain::{
    DomainError, DomainName, DomainStatus, ReindexReport, SearchResult, TextGenerator,
};
use crate::infrastructure::embedding::{HttpClient, OpenAiEmbeddingProvider};
use crate::infrastructure::generation::GenerationAdapterFactory;
use crate::infrastructure::ingestion::{ChunkerFactory, ReaderRegistry};
use crate::infrastructure::services::{
    EmbeddingStore, IndexCatalog, IngestionService, RagService, RagSettings, ReindexService,
    RetrievalService, DEFAULT_EMBEDDING_BATCH_SIZE,
};
use crate::infrastructure::storage::{FsArtifactStore, FsDocumentRepository};

/// Collaborators injected into the engine
pub struct RagEngineDeps {
    pub documents: Arc<dyn DocumentRepository>,
    pub snapshots: Arc<dyn SnapshotRepository>,
    pub indexes: Arc<dyn IndexRepository>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// `None` leaves `rag_answer` unavailable; search still works
    pub generator: Option<Arc<dyn TextGenerator>>,
}

/// Tunables taken from configuration
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub chunking: ChunkingConfig,
    pub batch_size: usize,
    pub default_top_k: usize,
    pub rag: RagSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
            default_top_k: 5,
            rag: RagSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            chunking: ChunkingConfig::new(config.chunking.max_words),
            batch_size: config.embedding.batch_size,
            default_top_k: config.retrieval.default_top_k,
            rag: RagSettings {
                timeout: Duration::from_secs(config.generation.timeout_secs),
                max_tokens: config.generation.max_tokens,
                temperature: config.generation.temperature,
            },
        }
    }
}

pub struct RagEngine {
    ingestion: Arc<IngestionService>,
    reindexer: ReindexService,
    retrieval: Arc<RetrievalService>,
    rag: Option<RagService>,
    generation_unavailable: Option<String>,
    catalog: Arc<IndexCatalog>,
    default_top_k: usize,
}

impl std::fmt::Debug for RagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagEngine")
            .field("rag", &self.rag)
            .field("default_top_k", &self.default_top_k)
            .finish()
    }
}

impl RagEngine {
    pub fn new(deps: RagEngineDeps, settings: EngineSettings) -> Result<Self, DomainError> {
        settings.chunking.validate()?;

        let ingestion = Arc::new(IngestionService::new(
            deps.documents,
            ReaderRegistry::default(),
        ));
        let store = Arc::new(
            EmbeddingStore::new(deps.embedder, deps.snapshots.clone(), deps.indexes.clone())
                .with_batch_size(settings.batch_size),
        );
        let catalog = Arc::new(IndexCatalog::new(deps.snapshots, deps.indexes));
        let retrieval = Arc::new(RetrievalService::new(store.clone(), catalog.clone()));
        let reindexer = ReindexService::new(
            ingestion.clone(),
            ChunkerFactory::create(),
            settings.chunking,
            store,
            catalog.clone(),
        );
        let rag = deps
            .generator
            .map(|generator| RagService::new(retrieval.clone(), generator, settings.rag));

        Ok(Self {
            ingestion,
            reindexer,
            retrieval,
            rag,
            generation_unavailable: None,
            catalog,
            default_top_k: settings.default_top_k,
        })
    }

    /// Wire the engine from configuration: filesystem storage under
    /// `storage.data_dir`, the HTTP embedding model and the configured
    /// generation backend.
    ///
    /// A missing generation backend is not fatal; only `rag_answer` fails.
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let data_dir = &config.storage.data_dir;
        let artifacts = Arc::new(FsArtifactStore::new(data_dir));

        let client = HttpClient::with_timeout(config.embedding.timeout())?;
        let mut embedder = OpenAiEmbeddingProvider::new(
            client,
            &config.embedding.base_url,
            &config.embedding.model,
            config.embedding.dimensions,
        );
        if let Some(key) = std::env::var(&config.embedding.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
        {
            embedder = embedder.with_api_key(key);
        }

        let (generator, generation_unavailable) =
            match GenerationAdapterFactory::create(&config.generation) {
                Ok(adapter) => (Some(Arc::new(adapter) as Arc<dyn TextGenerator>), None),
                Err(e) => {
                    warn!(error = %e, "No generation backend, answers are unavailable");
                    (None, Some(e.to_string()))
                }
            };

        let deps = RagEngineDeps {
            documents: Arc::new(FsDocumentRepository::new(data_dir)),
            snapshots: artifacts.clone(),
            indexes: artifacts,
            embedder: Arc::new(embedder),
            generator,
        };

        let mut engine = Self::new(deps, EngineSettings::from_config(config))?;
        engine.generation_unavailable = generation_unavailable;

        info!(data_dir = %data_dir.display(), "RAG engine ready");
        Ok(engine)
    }

    /// Load and verify every published index; reports corrupt pairs
    pub async fn warm(&self) -> Result<usize, DomainError> {
        self.catalog.warm().await
    }

    /// Store a raw document. Returns its storage location.
    pub async fn ingest(
        &self,
        domain: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, DomainError> {
        let domain = DomainName::new(domain)?;
        self.ingestion.ingest(&domain, filename, content).await
    }

    pub async fn reindex(&self, domain: &str) -> Result<ReindexReport, DomainError> {
        let domain = DomainName::new(domain)?;
        self.reindexer.reindex(&domain).await
    }

    pub async fn reindex_all(
        &self,
    ) -> Result<Vec<(DomainName, Result<ReindexReport, DomainError>)>, DomainError> {
        self.reindexer.reindex_all().await
    }

    /// `top_k` defaults to `retrieval.default_top_k`
    pub async fn search(
        &self,
        query: &str,
        domain: &str,
        top_k: Option<usize>,
    ) -> Result<SearchResult, DomainError> {
        let domain = DomainName::new(domain)?;
        self.retrieval
            .search(query, &domain, top_k.unwrap_or(self.default_top_k))
            .await
    }

    pub async fn rag_answer(
        &self,
        query: &str,
        domain: &str,
        top_k: Option<usize>,
    ) -> Result<String, DomainError> {
        let domain = DomainName::new(domain)?;
        let rag = self.rag.as_ref().ok_or_else(|| {
            DomainError::configuration(
                self.generation_unavailable
                    .clone()
                    .unwrap_or_else(|| "No generation backend configured".to_string()),
            )
        })?;

        rag.answer(query, &domain, top_k.unwrap_or(self.default_top_k))
            .await
    }

    /// Every domain with stored documents or a published index
    pub async fn domains(&self) -> Result<Vec<DomainName>, DomainError> {
        let mut domains = self.ingestion.domains().await?;
        domains.extend(self.catalog.published_domains().await?);
        domains.sort();
        domains.dedup();
        Ok(domains)
    }

    pub async fn status(&self, domain: &str) -> Result<DomainStatus, DomainError> {
        let domain = DomainName::new(domain)?;
        let published_version = self.catalog.current_version(&domain).await?;

        let chunks = match published_version {
            Some(_) => Some(self.catalog.get(&domain).await?.snapshot().len()),
            None => None,
        };

        Ok(DomainStatus {
            reindex: self.reindexer.state(&domain),
            domain,
            published_version,
            chunks,
        })
    }
}
