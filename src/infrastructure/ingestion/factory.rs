//! Factories for document readers and chunkers

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ingestion::{ChunkingStrategy, Document, DocumentFormat, DocumentReader};
use crate::domain::DomainError;

use super::chunkers::SentenceChunker;
use super::readers::{DocxReader, PdfReader, PlainTextReader};

/// Dispatches documents to the reader registered for their format
#[derive(Debug, Clone)]
pub struct ReaderRegistry {
    readers: HashMap<DocumentFormat, Arc<dyn DocumentReader>>,
}

impl ReaderRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            readers: HashMap::new(),
        }
    }

    /// Register a reader, replacing any existing reader for its format
    pub fn register(mut self, reader: Arc<dyn DocumentReader>) -> Self {
        self.readers.insert(reader.format(), reader);
        self
    }

    /// Get the reader for a format
    pub fn reader_for(&self, format: DocumentFormat) -> Option<Arc<dyn DocumentReader>> {
        self.readers.get(&format).cloned()
    }

    /// Whether a file name maps to a registered reader
    pub fn supports_file(&self, filename: &str) -> bool {
        DocumentFormat::from_filename(filename)
            .map(|format| self.readers.contains_key(&format))
            .unwrap_or(false)
    }

    /// Extract a document's text with the reader matching its extension
    pub async fn read(&self, document: &Document) -> Result<String, DomainError> {
        let reader = document
            .format()
            .and_then(|format| self.reader_for(format))
            .ok_or_else(|| {
                DomainError::ingestion(document.name(), "Unsupported document format")
            })?;

        reader.read(document).await
    }

    /// Get a list of all supported file extensions
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .readers
            .keys()
            .flat_map(|format| format.extensions().iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::empty()
            .register(Arc::new(PlainTextReader::new()))
            .register(Arc::new(PdfReader::new()))
            .register(Arc::new(DocxReader::new()))
    }
}

/// Factory for the chunking strategy
#[derive(Debug, Default)]
pub struct ChunkerFactory;

impl ChunkerFactory {
    pub fn create() -> Arc<dyn ChunkingStrategy> {
        Arc::new(SentenceChunker::new())
    }
}
