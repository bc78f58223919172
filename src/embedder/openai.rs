/// OpenAI embedding client using the `/embeddings` endpoint.
///
/// Batches are sent as a single request; the response order is restored from
/// the `index` field of each item.
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{Embedder, EmbedderError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_DIMENSIONS: usize = 1536;

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// Passed to the API only when overridden, for models that support truncation.
    request_dimensions: Option<usize>,
}

impl OpenAiEmbedder {
    /// Create a client for `text-embedding-3-small` with the given request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, EmbedderError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(EmbedderError::Request("API key must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedderError::Request(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output dimensions; also sent to the API when it differs from the model default.
    #[must_use]
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = (dims != DEFAULT_DIMENSIONS).then_some(dims);
        self
    }
}

// ── API request/response types ───────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedderError::MalformedResponse("empty data array".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "openai",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "openai", error = %e, "embedding request failed");
                EmbedderError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            error!(provider = "openai", %status, "embedding API error");
            return Err(EmbedderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedderError::MalformedResponse(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbedderError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);

        let mut vectors = Vec::with_capacity(data.len());
        for item in data {
            if item.embedding.len() != self.dimensions {
                return Err(EmbedderError::MalformedResponse(format!(
                    "expected {} dimensions, got {}",
                    self.dimensions,
                    item.embedding.len()
                )));
            }
            vectors.push(item.embedding);
        }

        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
