//! Document ingestion domain types and traits
//!
//! This module provides:
//! - `Document` and `DocumentFormat` for raw source files
//! - `DocumentReader` trait for extracting text per format
//! - `ChunkingStrategy` trait for splitting text into word-bounded chunks
//! - `DocumentRepository` trait for raw document storage

pub mod chunker;
pub mod document;
pub mod reader;
pub mod repository;

pub use chunker::{
    normalize_whitespace, word_count, Chunk, ChunkingConfig, ChunkingStrategy, DEFAULT_MAX_WORDS,
};
pub use document::{validate_document_name, Document, DocumentFormat};
pub use reader::DocumentReader;
pub use repository::{in_memory::InMemoryDocumentRepository, DocumentRepository};

#[cfg(test)]
pub use repository::MockDocumentRepository;
