use serde::Serialize;

/// A chunk held by the index, with its vector and precomputed norm.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub position: usize,
    pub content: String,
    pub embedding: Vec<f32>,
    pub(crate) norm: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub position: usize,
    pub content: String,
    pub similarity: f32,
}
