use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::embedder::Embedder;
use crate::error::{AppError, Result};
use crate::store::IndexStore;
use crate::store::models::SearchResult;

/// Top-k chunks for one query, most similar first, all from one generation.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedContext {
    pub generation: u64,
    pub chunks: Vec<SearchResult>,
}

impl RetrievedContext {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.content.as_str())
    }
}

pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<IndexStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<IndexStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Embed `query` and fetch the nearest chunks from the live generation.
    ///
    /// The snapshot is taken before the embedding call so a concurrent upload
    /// cannot mix generations within one request.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievedContext> {
        let generation = self.store.snapshot().await.ok_or(AppError::NoIndexAvailable)?;

        let query_vector = self.embedder.embed(query).await?;
        let chunks = generation.index.query(&query_vector, self.top_k)?;

        debug!(
            generation = generation.id,
            results = chunks.len(),
            top_similarity = chunks.first().map(|c| c.similarity),
            "retrieved context"
        );

        Ok(RetrievedContext {
            generation: generation.id,
            chunks,
        })
    }
}
