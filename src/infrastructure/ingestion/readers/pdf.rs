//! PDF document reader

use async_trait::async_trait;

use crate::domain::ingestion::{Document, DocumentFormat, DocumentReader};
use crate::domain::DomainError;

/// Reader for `.pdf` files
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentReader for PdfReader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    async fn read(&self, document: &Document) -> Result<String, DomainError> {
        let bytes = document.content().to_vec();
        let name = document.name().to_string();

        // Extraction is CPU-bound and may panic on malformed input
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| DomainError::ingestion(&name, format!("PDF extraction aborted: {}", e)))?
            .map_err(|e| DomainError::ingestion(&name, format!("PDF extraction failed: {}", e)))
    }
}
