//! Ingestion service - stores raw documents and reads them back as text

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ingestion::{Document, DocumentRepository};
use crate::domain::{DomainError, DomainName};
use crate::infrastructure::ingestion::ReaderRegistry;

/// Text extracted from one document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentText {
    pub name: String,
    pub text: String,
}

/// Every readable document of a domain, in ascending name order
#[derive(Debug, Clone, Default)]
pub struct DomainTexts {
    pub documents: Vec<DocumentText>,
    /// Documents skipped as unreadable or unsupported
    pub skipped: Vec<String>,
}

pub struct IngestionService {
    documents: Arc<dyn DocumentRepository>,
    readers: ReaderRegistry,
}

impl std::fmt::Debug for IngestionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionService")
            .field("readers", &self.readers.supported_extensions())
            .finish()
    }
}

impl IngestionService {
    pub fn new(documents: Arc<dyn DocumentRepository>, readers: ReaderRegistry) -> Self {
        Self { documents, readers }
    }

    /// Store a raw document under its domain. Nothing is parsed or indexed.
    pub async fn ingest(
        &self,
        domain: &DomainName,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, DomainError> {
        let document = Document::new(domain.clone(), filename, content)?;

        if !self.readers.supports_file(filename) {
            return Err(DomainError::ingestion(
                filename,
                format!(
                    "Unsupported document format (supported: {})",
                    self.readers.supported_extensions().join(", ")
                ),
            ));
        }

        let bytes = document.content().len();
        let location = self.documents.store(document).await?;

        info!(domain = %domain, document = filename, bytes = bytes, "Ingested document");
        Ok(location)
    }

    /// Document names of a domain
    pub async fn list(&self, domain: &DomainName) -> Result<Vec<String>, DomainError> {
        self.documents.list(domain).await
    }

    /// Domains holding at least one document
    pub async fn domains(&self) -> Result<Vec<DomainName>, DomainError> {
        self.documents.domains().await
    }

    /// Read every document of a domain, skipping the ones that cannot be read
    pub async fn read_domain(&self, domain: &DomainName) -> Result<DomainTexts, DomainError> {
        let mut texts = DomainTexts::default();

        for name in self.documents.list(domain).await? {
            let document = self.documents.load(domain, &name).await?;

            match self.readers.read(&document).await {
                Ok(text) => texts.documents.push(DocumentText { name, text }),
                Err(e) => {
                    warn!(domain = %domain, document = %name, error = %e, "Skipping document");
                    texts.skipped.push(name);
                }
            }
        }

        Ok(texts)
    }
}
