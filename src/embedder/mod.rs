/// Embedder trait and shared types for text embedding.
///
/// The embedding model is an external service; implementations only adapt
/// its API to this interface.
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for EmbedderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbedderError::Timeout
        } else {
            EmbedderError::Request(err.to_string())
        }
    }
}

/// Trait for text embedding implementations.
///
/// All implementations must be `Send + Sync` to allow concurrent use
/// behind `Arc`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text string into a vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

    /// Embed multiple text strings into vectors, one per input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of the embedding vectors.
    fn dimensions(&self) -> usize;
}
