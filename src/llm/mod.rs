/// Generative model capability.
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("model returned no content")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Request(err.to_string())
        }
    }
}

/// A text-in, text-out language model.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
