/// Mock embedder for tests and offline runs.
///
/// Produces deterministic hashed bag-of-words vectors, so texts sharing words
/// score higher under cosine similarity than unrelated texts.
use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;

use super::{Embedder, EmbedderError};

/// A mock embedder that hashes lowercase words into a fixed number of buckets.
///
/// Text without any alphanumeric word maps to the zero vector.
pub struct MockEmbedder {
    pub dimensions: usize,
}

impl MockEmbedder {
    /// Create a new `MockEmbedder` with the given dimensionality.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            embedding[bucket] += 1.0;
        }

        // L2 normalize
        let norm_sq: f32 = embedding.iter().map(|v| v * v).sum();
        if norm_sq > 0.0 {
            let inv = 1.0 / norm_sq.sqrt();
            for v in &mut embedding {
                *v *= inv;
            }
        }

        embedding
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self { dimensions: 384 }
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_mock_embed_dimensions() {
        let embedder = MockEmbedder::new(384);
        let result = embedder.embed("hello world").await.unwrap();
        assert_eq!(result.len(), 384);
    }

    #[tokio::test]
    async fn test_mock_embed_deterministic() {
        let embedder = MockEmbedder::new(384);
        let a = embedder.embed("hello").await.unwrap();
        let b = embedder.embed("hello").await.unwrap();
        assert_eq!(a, b, "same input should produce same output");
    }

    #[tokio::test]
    async fn test_mock_embed_case_insensitive() {
        let embedder = MockEmbedder::new(384);
        let a = embedder.embed("Secret Code").await.unwrap();
        let b = embedder.embed("secret code").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_mock_embed_shared_words_score_higher() {
        let embedder = MockEmbedder::new(384);
        let query = embedder.embed("rust ownership").await.unwrap();
        let related = embedder.embed("ownership in rust is strict").await.unwrap();
        let unrelated = embedder.embed("...").await.unwrap();
        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_mock_embed_normalized() {
        let embedder = MockEmbedder::new(384);
        let vec = embedder.embed("test normalization").await.unwrap();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!(
            (norm - 1.0).abs() < 0.01,
            "vector should be approximately unit length, got {norm}"
        );
    }

    #[tokio::test]
    async fn test_mock_embed_no_words_is_zero() {
        let embedder = MockEmbedder::new(16);
        let vec = embedder.embed("  ... --- ").await.unwrap();
        assert!(vec.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_mock_embed_batch() {
        let embedder = MockEmbedder::new(128);
        let results = embedder.embed_batch(&["a", "b", "c"]).await.unwrap();
        assert_eq!(results.len(), 3);
        for vec in &results {
            assert_eq!(vec.len(), 128);
        }
    }

    #[test]
    fn test_mock_default_dimensions() {
        let embedder = MockEmbedder::default();
        assert_eq!(embedder.dimensions(), 384);
    }
}
