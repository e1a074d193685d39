//! Filesystem storage
//!
//! Every write goes to a temporary file that is flushed and renamed into place.

mod atomic;
mod fs_artifacts;
mod fs_documents;

pub use fs_artifacts::FsArtifactStore;
pub use fs_documents::FsDocumentRepository;
