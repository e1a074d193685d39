//! Infrastructure services

mod catalog;
mod embedding_store;
mod ingestion_service;
mod rag_service;
mod reindex_service;
mod retrieval_service;

pub use catalog::{IndexCatalog, PublishedIndex};
pub use embedding_store::{EmbeddingStore, DEFAULT_EMBEDDING_BATCH_SIZE};
pub use ingestion_service::{DocumentText, DomainTexts, IngestionService};
pub use rag_service::{build_prompt, RagService, RagSettings, DEFAULT_GENERATION_TIMEOUT};
pub use reindex_service::ReindexService;
pub use retrieval_service::RetrievalService;
