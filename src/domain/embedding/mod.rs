//! Embedding model domain types, traits and snapshots

mod provider;
mod request;
mod response;
pub mod snapshot;

pub use provider::EmbeddingProvider;
pub use request::EmbeddingRequest;
pub use response::{squared_l2_distance, Embedding, EmbeddingResponse, EmbeddingUsage};
pub use snapshot::{
    in_memory::InMemorySnapshotRepository, ChunkRecord, EmbeddingSnapshot, SnapshotRepository,
};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
