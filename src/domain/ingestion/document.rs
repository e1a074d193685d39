//! Raw source documents

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainName};

/// Maximum length for document file names
pub const MAX_DOCUMENT_NAME_LENGTH: usize = 255;

/// Format of a raw document, detected from its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a file name extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;

        match ext.to_lowercase().as_str() {
            "txt" | "text" | "md" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::PlainText => &["txt", "text", "md"],
            Self::Pdf => &["pdf"],
            Self::Docx => &["docx"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

/// Validate a document file name: a plain name, never a path
pub fn validate_document_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Document name cannot be empty"));
    }

    if name.len() > MAX_DOCUMENT_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "Document name cannot exceed {} characters",
            MAX_DOCUMENT_NAME_LENGTH
        )));
    }

    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(DomainError::validation(format!(
            "Invalid document name '{}': must be a plain file name",
            name
        )));
    }

    Ok(())
}

/// A raw source file belonging to exactly one domain
#[derive(Debug, Clone)]
pub struct Document {
    domain: DomainName,
    name: String,
    content: Vec<u8>,
}

impl Document {
    pub fn new(
        domain: DomainName,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        validate_document_name(&name)?;

        Ok(Self {
            domain,
            name,
            content: content.into(),
        })
    }

    pub fn domain(&self) -> &DomainName {
        &self.domain
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    /// Format tag, or `None` when the extension is not supported
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_filename(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn law() -> DomainName {
        DomainName::new("law").unwrap()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::from_filename("claims.txt"),
            Some(DocumentFormat::PlainText)
        );
        assert_eq!(
            DocumentFormat::from_filename("notes.MD"),
            Some(DocumentFormat::PlainText)
        );
        assert_eq!(
            DocumentFormat::from_filename("contract.PDF"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_filename("brief.docx"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_filename("sheet.xlsx"), None);
        assert_eq!(DocumentFormat::from_filename("README"), None);
    }

    #[test]
    fn test_document_rejects_paths() {
        assert!(Document::new(law(), "../secret.txt", b"x".to_vec()).is_err());
        assert!(Document::new(law(), "dir/file.txt", b"x".to_vec()).is_err());
        assert!(Document::new(law(), "..", b"x".to_vec()).is_err());
        assert!(Document::new(law(), "", b"x".to_vec()).is_err());
    }

    #[test]
    fn test_document_accessors() {
        let doc = Document::new(law(), "claims.txt", b"hello".to_vec()).unwrap();

        assert_eq!(doc.domain().as_str(), "law");
        assert_eq!(doc.name(), "claims.txt");
        assert_eq!(doc.content(), b"hello");
        assert_eq!(doc.format(), Some(DocumentFormat::PlainText));
    }
}
