//! Infrastructure layer - External service implementations

pub mod embedding;
pub mod generation;
pub mod ingestion;
pub mod logging;
pub mod services;
pub mod storage;
