//! Embedding request types

use serde::{Deserialize, Serialize};

/// Request to embed an ordered batch of texts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Model to use for embedding
    model: String,
    /// Texts to embed, in order
    inputs: Vec<String>,
    /// Optional output dimensions (for models that support it)
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

impl EmbeddingRequest {
    /// Create a request for a single text
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self::batch(model, vec![text.into()])
    }

    /// Create a request for multiple texts
    pub fn batch(model: impl Into<String>, inputs: Vec<String>) -> Self {
        Self {
            model: model.into(),
            inputs,
            dimensions: None,
        }
    }

    /// Set the output dimensions
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_request_single() {
        let request = EmbeddingRequest::single("all-minilm-l6-v2", "test");

        assert_eq!(request.model(), "all-minilm-l6-v2");
        assert_eq!(request.inputs(), &["test".to_string()]);
        assert_eq!(request.len(), 1);
    }

    #[test]
    fn test_embedding_request_batch_with_dimensions() {
        let request = EmbeddingRequest::batch("all-minilm-l6-v2", vec!["a".into(), "b".into()])
            .with_dimensions(384);

        assert_eq!(request.len(), 2);
        assert!(!request.is_empty());
        assert_eq!(request.dimensions(), Some(384));
    }
}
