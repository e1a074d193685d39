//! Retrieval result types

use serde::{Deserialize, Serialize};

use super::DomainName;

/// One retrieved chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    /// Squared L2 distance to the query vector
    pub distance: f32,
    pub document: String,
    pub ordinal: usize,
}

/// Hits for one query, ascending by distance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub domain: DomainName,
    pub snapshot_version: u64,
    pub hits: Vec<SearchHit>,
}

impl SearchResult {
    pub fn texts(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
