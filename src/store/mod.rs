//! In-memory vector index and the process-wide generation cell.
//!
//! A [`VectorIndex`] is immutable once built. [`IndexStore`] holds the one live
//! generation; ingestion swaps in a complete replacement, readers clone the
//! `Arc` and keep a consistent snapshot for the rest of their request.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

pub mod models;
pub mod search;

use models::IndexedChunk;
use search::l2_norm;

/// Default number of chunks returned per query.
pub const DEFAULT_TOP_K: usize = 4;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index is empty")]
    Empty,

    #[error("vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Immutable snapshot of (vector, chunk text) pairs.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index from pairs in insertion order.
    ///
    /// All vectors must share the dimension of the first one.
    pub fn build<I>(pairs: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (Vec<f32>, String)>,
    {
        let mut entries = Vec::new();
        let mut dimensions = 0;

        for (position, (embedding, content)) in pairs.into_iter().enumerate() {
            if position == 0 {
                dimensions = embedding.len();
            } else if embedding.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    found: embedding.len(),
                });
            }

            let norm = l2_norm(&embedding);
            entries.push(IndexedChunk {
                position,
                content,
                embedding,
                norm,
            });
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn chunks(&self) -> impl Iterator<Item = &IndexedChunk> {
        self.entries.iter()
    }
}

/// One installed version of the index.
#[derive(Debug)]
pub struct Generation {
    pub id: u64,
    pub source: String,
    pub built_at: DateTime<Utc>,
    pub index: VectorIndex,
}

/// Process-wide cell holding at most one live generation.
#[derive(Debug, Default)]
pub struct IndexStore {
    current: RwLock<Option<Arc<Generation>>>,
    next_id: AtomicU64,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation, if any document has been ingested.
    pub async fn snapshot(&self) -> Option<Arc<Generation>> {
        self.current.read().await.clone()
    }

    /// Install `index` as the live generation, discarding the previous one.
    ///
    /// Concurrent callers race; the last swap wins.
    pub async fn replace(&self, index: VectorIndex, source: impl Into<String>) -> Arc<Generation> {
        let source = source.into();

        // Ids are taken under the write guard so install order matches id order
        let (generation, previous) = {
            let mut current = self.current.write().await;
            let generation = Arc::new(Generation {
                id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                source,
                built_at: Utc::now(),
                index,
            });
            let previous = current.replace(Arc::clone(&generation));
            (generation, previous)
        };

        info!(
            generation = generation.id,
            chunks = generation.index.len(),
            replaced = previous.map(|p| p.id),
            "installed index generation"
        );

        generation
    }
}
