//! Document ingestion infrastructure
//!
//! Readers extract text per document format; chunkers split that text into
//! word-bounded chunks.

pub mod chunkers;
pub mod factory;
pub mod readers;

pub use chunkers::SentenceChunker;
pub use factory::{ChunkerFactory, ReaderRegistry};
pub use readers::{DocxReader, PdfReader, PlainTextReader};
