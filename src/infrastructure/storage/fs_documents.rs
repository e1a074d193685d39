//! Filesystem-backed raw document repository
//!
//! Layout: `<data_dir>/documents/<domain>/<filename>`, original bytes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::atomic::{io_error, is_temporary, read_optional, write_atomic};
use crate::domain::ingestion::{validate_document_name, Document, DocumentRepository};
use crate::domain::{DomainError, DomainName};

#[derive(Debug, Clone)]
pub struct FsDocumentRepository {
    root: PathBuf,
}

impl FsDocumentRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().join("documents"),
        }
    }

    fn domain_dir(&self, domain: &DomainName) -> PathBuf {
        self.root.join(domain.as_str())
    }
}

/// File names in a directory, sorted; a missing directory is empty
async fn list_files(dir: &Path) -> Result<Vec<String>, DomainError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(io_error("list", dir, e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| io_error("list", dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| io_error("inspect", &entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            continue;
        };

        if !is_temporary(&name) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

#[async_trait]
impl DocumentRepository for FsDocumentRepository {
    async fn store(&self, document: Document) -> Result<String, DomainError> {
        let path = self.domain_dir(document.domain()).join(document.name());

        write_atomic(&path, document.content()).await?;

        debug!(
            domain = %document.domain(),
            document = document.name(),
            bytes = document.content().len(),
            "Stored document"
        );

        Ok(path.display().to_string())
    }

    async fn list(&self, domain: &DomainName) -> Result<Vec<String>, DomainError> {
        list_files(&self.domain_dir(domain)).await
    }

    async fn load(&self, domain: &DomainName, name: &str) -> Result<Document, DomainError> {
        validate_document_name(name)?;
        let path = self.domain_dir(domain).join(name);

        let content = read_optional(&path).await?.ok_or_else(|| {
            DomainError::not_found(format!("Document '{}' not found in domain '{}'", name, domain))
        })?;

        Document::new(domain.clone(), name, content)
    }

    async fn domains(&self) -> Result<Vec<DomainName>, DomainError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(io_error("list", &self.root, e)),
        };

        let mut domains = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list", &self.root, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Ok(domain) = DomainName::new(name.as_str()) else {
                debug!(directory = %name, "Ignoring directory that is not a valid domain name");
                continue;
            };

            if !list_files(&entry.path()).await?.is_empty() {
                domains.push(domain);
            }
        }

        domains.sort();
        Ok(domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(name: &str) -> DomainName {
        DomainName::new(name).unwrap()
    }

    fn doc(d: &str, name: &str, content: &[u8]) -> Document {
        Document::new(domain(d), name, content.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_store_longest_valid_name() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsDocumentRepository::new(dir.path());
        let name = format!(
            "{}.txt",
            "n".repeat(crate::domain::ingestion::document::MAX_DOCUMENT_NAME_LENGTH - 4)
        );

        repo.store(doc("law", &name, b"Long name.")).await.unwrap();

        assert_eq!(repo.list(&domain("law")).await.unwrap(), vec![name]);
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsDocumentRepository::new(dir.path());

        let location = repo
            .store(doc("law", "claims.txt", b"A car accident claim requires proof."))
            .await
            .unwrap();

        assert!(location.ends_with("documents/law/claims.txt"));
        assert!(dir.path().join("documents/law/claims.txt").exists());

        let loaded = repo.load(&domain("law"), "claims.txt").await.unwrap();
        assert_eq!(loaded.content(), b"A car accident claim requires proof.");
    }

    #[tokio::test]
    async fn test_store_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsDocumentRepository::new(dir.path());

        repo.store(doc("law", "a.txt", b"old")).await.unwrap();
        repo.store(doc("law", "a.txt", b"new")).await.unwrap();

        let loaded = repo.load(&domain("law"), "a.txt").await.unwrap();
        assert_eq!(loaded.content(), b"new");
        assert_eq!(repo.list(&domain("law")).await.unwrap(), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_list_sorted_and_missing_domain_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsDocumentRepository::new(dir.path());

        repo.store(doc("law", "b.txt", b"b")).await.unwrap();
        repo.store(doc("law", "a.pdf", b"a")).await.unwrap();

        assert_eq!(
            repo.list(&domain("law")).await.unwrap(),
            vec!["a.pdf", "b.txt"]
        );
        assert!(repo.list(&domain("medical")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsDocumentRepository::new(dir.path());

        let result = repo.load(&domain("law"), "missing.txt").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_domains_discovered_from_directories() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsDocumentRepository::new(dir.path());

        repo.store(doc("medical", "a.txt", b"a")).await.unwrap();
        repo.store(doc("law", "b.txt", b"b")).await.unwrap();
        tokio::fs::create_dir_all(dir.path().join("documents/empty"))
            .await
            .unwrap();
        tokio::fs::create_dir_all(dir.path().join("documents/Not Valid"))
            .await
            .unwrap();

        assert_eq!(
            repo.domains().await.unwrap(),
            vec![domain("law"), domain("medical")]
        );
    }

    #[tokio::test]
    async fn test_domains_without_root() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsDocumentRepository::new(dir.path().join("nowhere"));

        assert!(repo.domains().await.unwrap().is_empty());
    }
}
