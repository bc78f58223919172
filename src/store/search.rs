use super::models::SearchResult;
use super::{IndexError, VectorIndex};

/// L2 norm of a vector.
pub(crate) fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity given precomputed norms. Zero-magnitude vectors score 0.
fn cosine_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

impl VectorIndex {
    /// Brute-force cosine search returning the `top_k` most similar chunks,
    /// most similar first. Equal scores keep insertion order.
    pub fn query(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<SearchResult>, IndexError> {
        if self.entries.is_empty() {
            return Err(IndexError::Empty);
        }
        if query_vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                found: query_vector.len(),
            });
        }

        let query_norm = l2_norm(query_vector);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let score = cosine_with_norms(&entry.embedding, entry.norm, query_vector, query_norm);
                (i, score)
            })
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, similarity)| {
                let entry = &self.entries[i];
                SearchResult {
                    position: entry.position,
                    content: entry.content.clone(),
                    similarity,
                }
            })
            .collect())
    }
}
