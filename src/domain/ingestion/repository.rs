//! Raw document repository trait

use async_trait::async_trait;

use super::Document;
use crate::domain::{DomainError, DomainName};

#[cfg(test)]
use mockall::automock;

/// Repository for raw documents, scoped by domain
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Stores a document, replacing any previous one with the same name.
    /// Returns the storage location.
    async fn store(&self, document: Document) -> Result<String, DomainError>;

    /// Lists the document names of a domain in ascending order
    async fn list(&self, domain: &DomainName) -> Result<Vec<String>, DomainError>;

    /// Loads one document
    async fn load(&self, domain: &DomainName, name: &str) -> Result<Document, DomainError>;

    /// Lists every domain that has at least one stored document
    async fn domains(&self) -> Result<Vec<DomainName>, DomainError>;
}

/// In-memory implementation of DocumentRepository
pub mod in_memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct InMemoryDocumentRepository {
        documents: RwLock<BTreeMap<DomainName, BTreeMap<String, Vec<u8>>>>,
    }

    impl InMemoryDocumentRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl DocumentRepository for InMemoryDocumentRepository {
        async fn store(&self, document: Document) -> Result<String, DomainError> {
            let mut documents = self
                .documents
                .write()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            let location = format!("memory://{}/{}", document.domain(), document.name());
            let domain = document.domain().clone();
            let name = document.name().to_string();

            documents
                .entry(domain)
                .or_default()
                .insert(name, document.into_content());

            Ok(location)
        }

        async fn list(&self, domain: &DomainName) -> Result<Vec<String>, DomainError> {
            let documents = self
                .documents
                .read()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            Ok(documents
                .get(domain)
                .map(|docs| docs.keys().cloned().collect())
                .unwrap_or_default())
        }

        async fn load(&self, domain: &DomainName, name: &str) -> Result<Document, DomainError> {
            let documents = self
                .documents
                .read()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            let content = documents
                .get(domain)
                .and_then(|docs| docs.get(name))
                .cloned()
                .ok_or_else(|| {
                    DomainError::not_found(format!("Document '{}/{}' not found", domain, name))
                })?;

            Document::new(domain.clone(), name, content)
        }

        async fn domains(&self) -> Result<Vec<DomainName>, DomainError> {
            let documents = self
                .documents
                .read()
                .map_err(|_| DomainError::storage("Failed to acquire lock"))?;

            Ok(documents
                .iter()
                .filter(|(_, docs)| !docs.is_empty())
                .map(|(domain, _)| domain.clone())
                .collect())
        }
    }

}
