/// Echo generator for tests and offline runs.
///
/// Returns the rendered prompt unchanged, which makes the retrieved context
/// observable in the answer.
use async_trait::async_trait;

use super::{GenerationError, Generator};

#[derive(Debug, Default, Clone, Copy)]
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(prompt.to_string())
    }
}

/// A generator that always fails, for exercising error paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Api {
            status: 503,
            message: "model unavailable".to_string(),
        })
    }
}
