//! Domain layer: core types, traits and invariants of the answer engine

pub mod domain_name;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod reindex;
pub mod retrieval;
pub mod vector_index;

pub use domain_name::{DomainName, DomainNameError};
pub use embedding::{EmbeddingProvider, EmbeddingSnapshot, SnapshotRepository};
pub use error::DomainError;
pub use generation::{GenerationRequest, GenerationResponse, TextGenerator};
pub use ingestion::{Chunk, ChunkingConfig, ChunkingStrategy, Document, DocumentFormat};
pub use reindex::{DomainStatus, ReindexReport, ReindexState};
pub use retrieval::{SearchHit, SearchResult};
pub use vector_index::{FlatIndex, IndexRepository, Neighbor};
