//! Embedding response types

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A single embedding vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    /// Index of this embedding in the batch
    index: usize,
    /// The embedding vector
    embedding: Vec<f32>,
}

impl Embedding {
    pub fn new(index: usize, embedding: Vec<f32>) -> Self {
        Self { index, embedding }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn vector(&self) -> &[f32] {
        &self.embedding
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }

    pub fn into_vector(self) -> Vec<f32> {
        self.embedding
    }
}

/// Squared Euclidean distance between two vectors of equal length
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Usage statistics for embedding request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

impl EmbeddingUsage {
    pub fn new(prompt_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            total_tokens,
        }
    }

    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Response from an embedding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    model: String,
    data: Vec<Embedding>,
    usage: EmbeddingUsage,
}

impl EmbeddingResponse {
    pub fn new(model: String, data: Vec<Embedding>, usage: EmbeddingUsage) -> Self {
        Self { model, data, usage }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.data
    }

    pub fn usage(&self) -> &EmbeddingUsage {
        &self.usage
    }

    /// Consume the response into vectors ordered by batch index.
    ///
    /// Fails when the response does not carry exactly one vector per input
    /// or when a vector does not have the expected dimension.
    pub fn into_ordered_vectors(
        self,
        expected_count: usize,
        dimensions: usize,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        if self.data.len() != expected_count {
            return Err(DomainError::provider(
                "embedding",
                format!(
                    "Expected {} embeddings, received {}",
                    expected_count,
                    self.data.len()
                ),
            ));
        }

        let mut data = self.data;
        data.sort_by_key(|e| e.index());

        data.into_iter()
            .enumerate()
            .map(|(position, embedding)| {
                if embedding.index() != position {
                    return Err(DomainError::provider(
                        "embedding",
                        format!("Missing embedding for input {}", position),
                    ));
                }
                if embedding.dimensions() != dimensions {
                    return Err(DomainError::provider(
                        "embedding",
                        format!(
                            "Embedding {} has dimension {}, expected {}",
                            position,
                            embedding.dimensions(),
                            dimensions
                        ),
                    ));
                }
                Ok(embedding.into_vector())
            })
            .collect()
    }
}
