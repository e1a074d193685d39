//! Per-domain vector index types and storage traits

mod flat;
pub mod repository;

pub use flat::{FlatIndex, Neighbor};
pub use repository::{in_memory::InMemoryIndexRepository, IndexRepository};
