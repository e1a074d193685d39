//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::{DomainError, DomainName};

/// Default upper bound on words per chunk
pub const DEFAULT_MAX_WORDS: usize = 200;

/// Configuration for chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum number of words packed into one chunk
    pub max_words: usize,
}

impl ChunkingConfig {
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_words == 0 {
            return Err(DomainError::validation("max_words must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

/// A bounded span of normalized text derived from one document.
///
/// Identity is `(domain, document, ordinal)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub domain: DomainName,
    pub document: String,
    pub ordinal: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(
        domain: DomainName,
        document: impl Into<String>,
        ordinal: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            domain,
            document: document.into(),
            ordinal,
            text: text.into(),
        }
    }
}

/// Trait for text chunking strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split text into chunk texts, in order
    fn split(&self, text: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;

    /// Split a document's text into chunks carrying their provenance
    fn chunk(
        &self,
        domain: &DomainName,
        document: &str,
        text: &str,
        config: &ChunkingConfig,
    ) -> Result<Vec<Chunk>, DomainError> {
        Ok(self
            .split(text, config)?
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Chunk::new(domain.clone(), document, ordinal, text))
            .collect())
    }
}

/// Collapse every run of whitespace to a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
