//! Chunking strategy implementations

mod sentence;

pub use sentence::SentenceChunker;
