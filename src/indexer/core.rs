use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::embedder::{Embedder, EmbedderError};
use crate::error::{AppError, Result};
use crate::indexer::chunker::Chunker;
use crate::indexer::extract::{self, DocumentKind};
use crate::store::{IndexStore, VectorIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub filename: String,
    pub chunks: usize,
    pub generation: u64,
}

/// Load → chunk → embed → build, then swap the new index in.
///
/// The store is touched only after every step succeeded, so a failed ingest
/// leaves the previous generation installed.
pub struct DocumentIngestor {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    store: Arc<IndexStore>,
    batch_size: usize,
}

impl DocumentIngestor {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn Embedder>,
        store: Arc<IndexStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            chunker,
            embedder,
            store,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn ingest(&self, bytes: Vec<u8>, filename: &str) -> Result<IngestReport> {
        let kind = DocumentKind::from_filename(filename);
        if let DocumentKind::Unsupported(ext) = &kind {
            return Err(AppError::UnsupportedFileType(ext.clone()));
        }

        info!(filename, kind = kind.label(), bytes = bytes.len(), "running embedding");

        let text = extract::extract_text(&kind, bytes).await?;
        let chunks = self.chunker.split(&text);
        if chunks.is_empty() {
            warn!(filename, "document has no extractable text");
            return Err(AppError::Extraction(format!(
                "{filename} contains no extractable text"
            )));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let vectors = self.embed_all(&texts).await?;

        let index = VectorIndex::build(
            vectors
                .into_iter()
                .zip(chunks.into_iter().map(|c| c.content)),
        )?;
        let chunk_count = index.len();

        let generation = self.store.replace(index, filename).await;
        info!(
            filename,
            chunks = chunk_count,
            generation = generation.id,
            "document embedded and stored"
        );

        Ok(IngestReport {
            filename: filename.to_string(),
            chunks: chunk_count,
            generation: generation.id,
        })
    }

    async fn embed_all(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, EmbedderError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embedded = self.embedder.embed_batch(batch).await?;
            if embedded.len() != batch.len() {
                return Err(EmbedderError::MalformedResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::mock::MockEmbedder;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts batch calls and fails once `fail_after` batches have succeeded.
    struct FlakyEmbedder {
        inner: MockEmbedder,
        calls: AtomicUsize,
        fail_after: usize,
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbedderError> {
            self.inner.embed(text).await
        }

        async fn embed_batch(
            &self,
            texts: &[&str],
        ) -> std::result::Result<Vec<Vec<f32>>, EmbedderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.fail_after {
                return Err(EmbedderError::Timeout);
            }
            self.inner.embed_batch(texts).await
        }

        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }
    }

    fn ingestor(embedder: Arc<dyn Embedder>, store: Arc<IndexStore>, batch: usize) -> DocumentIngestor {
        DocumentIngestor::new(Chunker::new(1000, 200).unwrap(), embedder, store, batch)
    }

    #[tokio::test]
    async fn test_ingest_text_file() {
        let store = Arc::new(IndexStore::new());
        let ing = ingestor(Arc::new(MockEmbedder::new(64)), store.clone(), 100);

        let text = "word ".repeat(600); // 3000 chars
        let report = ing.ingest(text.into_bytes(), "notes.txt").await.unwrap();

        assert_eq!(report.chunks, 4);
        assert_eq!(report.generation, 1);
        assert_eq!(report.filename, "notes.txt");

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.index.len(), 4);
        assert_eq!(snapshot.index.dimensions(), 64);
        assert_eq!(snapshot.source, "notes.txt");
    }

    #[tokio::test]
    async fn test_ingest_batches_requests() {
        let store = Arc::new(IndexStore::new());
        let embedder = Arc::new(FlakyEmbedder {
            inner: MockEmbedder::new(8),
            calls: AtomicUsize::new(0),
            fail_after: usize::MAX,
        });
        let ing = ingestor(embedder.clone(), store, 3);

        let text = "a".repeat(6000); // 8 chunks
        let report = ing.ingest(text.into_bytes(), "a.txt").await.unwrap();
        assert_eq!(report.chunks, 8);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unsupported_type_leaves_index_untouched() {
        let store = Arc::new(IndexStore::new());
        let ing = ingestor(Arc::new(MockEmbedder::new(8)), store.clone(), 100);
        ing.ingest(b"first document".to_vec(), "a.txt").await.unwrap();

        let err = ing
            .ingest(b"PK\x03\x04".to_vec(), "letter.docx")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType(ref ext) if ext == ".docx"));

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.id, 1);
        assert_eq!(snapshot.source, "a.txt");
    }

    #[tokio::test]
    async fn test_embedding_failure_is_fail_atomic() {
        let store = Arc::new(IndexStore::new());
        let good = ingestor(Arc::new(MockEmbedder::new(8)), store.clone(), 100);
        good.ingest(b"original".to_vec(), "a.txt").await.unwrap();

        // Second batch fails after the first one succeeded
        let flaky = ingestor(
            Arc::new(FlakyEmbedder {
                inner: MockEmbedder::new(8),
                calls: AtomicUsize::new(0),
                fail_after: 1,
            }),
            store.clone(),
            1,
        );
        let err = flaky
            .ingest("b".repeat(2500).into_bytes(), "b.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Embedding(EmbedderError::Timeout)));

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.source, "a.txt");
        assert_eq!(snapshot.index.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_document_rejected() {
        let store = Arc::new(IndexStore::new());
        let ing = ingestor(Arc::new(MockEmbedder::new(8)), store.clone(), 100);
        let err = ing.ingest(Vec::new(), "empty.txt").await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
        assert!(store.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_extraction_error() {
        let store = Arc::new(IndexStore::new());
        let ing = ingestor(Arc::new(MockEmbedder::new(8)), store, 100);
        let err = ing.ingest(vec![0xc3, 0x28], "bad.txt").await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_extraction_error() {
        let store = Arc::new(IndexStore::new());
        let ing = ingestor(Arc::new(MockEmbedder::new(8)), store, 100);
        let err = ing
            .ingest(b"not a pdf".to_vec(), "scan.PDF")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
