//! PMP RAG Engine
//!
//! Multi-domain retrieval-augmented generation:
//! - Raw documents stored per domain (plain text, PDF, DOCX)
//! - Sentence-packed chunks embedded into versioned snapshots
//! - Exact flat L2 vector search over the published snapshot
//! - Answers generated by an OpenAI or Gemini backend
//! - Reindexing that swaps a domain's index atomically

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{DomainError, DomainName, DomainStatus, ReindexReport, SearchHit, SearchResult};
pub use engine::{EngineSettings, RagEngine, RagEngineDeps};
