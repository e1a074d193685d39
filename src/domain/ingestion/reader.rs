//! Document reader trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::{Document, DocumentFormat};
use crate::domain::DomainError;

/// Extracts raw text from a document of one format
#[async_trait]
pub trait DocumentReader: Send + Sync + Debug {
    /// The format this reader handles
    fn format(&self) -> DocumentFormat;

    /// Extract the document's text
    async fn read(&self, document: &Document) -> Result<String, DomainError>;

    /// Check if this reader can handle the given file name
    fn supports_file(&self, filename: &str) -> bool {
        DocumentFormat::from_filename(filename) == Some(self.format())
    }
}
