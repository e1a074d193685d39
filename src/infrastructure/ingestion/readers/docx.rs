//! DOCX document reader

use std::io::Read;

use async_trait::async_trait;
use quick_xml::events::Event;

use crate::domain::ingestion::{Document, DocumentFormat, DocumentReader};
use crate::domain::DomainError;

const DOCUMENT_XML: &str = "word/document.xml";
/// Maximum decompressed size of `word/document.xml`
const MAX_DOCUMENT_XML_BYTES: u64 = 50 * 1024 * 1024;

/// Reader for `.docx` files: paragraph text from `word/document.xml`, one paragraph per line
#[derive(Debug, Clone, Default)]
pub struct DocxReader;

impl DocxReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentReader for DocxReader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    async fn read(&self, document: &Document) -> Result<String, DomainError> {
        let xml = read_document_xml(document.content())
            .map_err(|e| DomainError::ingestion(document.name(), e))?;

        extract_paragraphs(&xml).map_err(|e| DomainError::ingestion(document.name(), e))
    }
}

fn read_document_xml(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| e.to_string())?;

    let entry = archive
        .by_name(DOCUMENT_XML)
        .map_err(|_| format!("{} not found", DOCUMENT_XML))?;

    let mut xml = Vec::new();
    entry
        .take(MAX_DOCUMENT_XML_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| e.to_string())?;

    if xml.len() as u64 >= MAX_DOCUMENT_XML_BYTES {
        return Err(format!("{} exceeds size limit", DOCUMENT_XML));
    }

    Ok(xml)
}

/// Concatenate `w:t` runs, ending each `w:p` paragraph with a newline
fn extract_paragraphs(xml: &[u8]) -> Result<String, String> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut out = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !paragraph.trim().is_empty() {
                        out.push_str(paragraph.trim());
                        out.push('\n');
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tab" => paragraph.push(' '),
            Ok(Event::Text(te)) if in_text => {
                let text = te.unescape().map_err(|e| e.to_string())?;
                paragraph.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }

    if !paragraph.trim().is_empty() {
        out.push_str(paragraph.trim());
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainName;
    use std::io::Write;

    fn docx_with(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_XML, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn doc(name: &str, content: Vec<u8>) -> Document {
        Document::new(DomainName::new("law").unwrap(), name, content).unwrap()
    }

    #[tokio::test]
    async fn test_paragraphs_separated_by_newlines() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>A car accident </w:t></w:r><w:r><w:t>claim requires proof.</w:t></w:r></w:p>
    <w:p><w:r><w:t>File within 30 days &amp; keep receipts.</w:t></w:r></w:p>
    <w:p></w:p>
  </w:body>
</w:document>"#;

        let text = DocxReader::new()
            .read(&doc("brief.docx", docx_with(xml)))
            .await
            .unwrap();

        assert_eq!(
            text,
            "A car accident claim requires proof.\nFile within 30 days & keep receipts.\n"
        );
    }

    #[tokio::test]
    async fn test_not_a_zip_is_ingestion_error() {
        let result = DocxReader::new()
            .read(&doc("broken.docx", b"not a zip".to_vec()))
            .await;

        assert!(matches!(result, Err(DomainError::Ingestion { .. })));
    }

    #[tokio::test]
    async fn test_missing_document_xml() {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = DocxReader::new()
            .read(&doc("empty.docx", bytes))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("word/document.xml not found"));
    }
}
