//! Plain text document reader

use async_trait::async_trait;

use crate::domain::ingestion::{Document, DocumentFormat, DocumentReader};
use crate::domain::DomainError;

/// Reader for `.txt`, `.text` and `.md` files
#[derive(Debug, Clone, Default)]
pub struct PlainTextReader;

impl PlainTextReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentReader for PlainTextReader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::PlainText
    }

    async fn read(&self, document: &Document) -> Result<String, DomainError> {
        let text = std::str::from_utf8(document.content()).map_err(|e| {
            DomainError::ingestion(document.name(), format!("Invalid UTF-8: {}", e))
        })?;

        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}
