//! Semantic search over indexed call transcripts.
//!
//! The coordinator owns the query-side flow: normalize the query text the
//! same way indexed text was normalized, embed it, then delegate to the
//! vector store. Stage failures are wrapped so the caller can tell which
//! stage broke; an empty result set is a normal outcome, not an error.

use crate::embedding::Embedder;
use crate::error::{Result, SamtalError};
use crate::text::normalize;
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default result cap: zero means unlimited.
pub const DEFAULT_MAX_RESULTS: usize = 0;
/// Default similarity threshold.
pub const DEFAULT_MIN_SIMILARITY_SCORE: f32 = 0.8;

/// Coordinates query embedding and vector lookup.
pub struct SearchCoordinator {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl SearchCoordinator {
    /// Create a coordinator over the given embedder and store.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Find transcript segments similar to the query text.
    #[instrument(skip(self, query_text))]
    pub async fn find_similar_transcripts(
        &self,
        query_text: &str,
        max_results: usize,
        min_similarity_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let normalized = normalize(query_text);
        if normalized.is_empty() {
            return Err(SamtalError::InvalidInput(
                "Search query must not be empty".to_string(),
            ));
        }

        let query_vector = self
            .embedder
            .embed(&normalized)
            .await
            .map_err(|e| SamtalError::Search(format!("Query embedding failed: {}", e)))?;

        let results = self
            .store
            .search(&query_vector, max_results, min_similarity_score)
            .await
            .map_err(|e| SamtalError::Search(format!("Vector lookup failed: {}", e)))?;

        debug!("Query matched {} records", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{EmbeddingRecord, MemoryVectorStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Embedder that returns canned vectors and records what it was asked.
    struct FakeEmbedder {
        vector: Vec<f32>,
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeEmbedder {
        fn returning(vector: Vec<f32>) -> Self {
            Self {
                vector,
                seen: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.seen.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(SamtalError::Embedding("provider down".to_string()));
            }
            Ok(self.vector.clone())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            self.vector.len()
        }
    }

    #[tokio::test]
    async fn test_query_is_normalized_before_embedding() {
        let embedder = Arc::new(FakeEmbedder::returning(vec![1.0, 0.0]));
        let store = Arc::new(MemoryVectorStore::new());
        let coordinator = SearchCoordinator::new(embedder.clone(), store);

        coordinator
            .find_similar_transcripts("late   checkout\n\nquestion", 0, 0.0)
            .await
            .unwrap();

        let seen = embedder.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), ["late checkout question"]);
    }

    #[tokio::test]
    async fn test_empty_query_is_invalid_input() {
        let embedder = Arc::new(FakeEmbedder::returning(vec![1.0, 0.0]));
        let coordinator = SearchCoordinator::new(embedder, Arc::new(MemoryVectorStore::new()));

        let err = coordinator
            .find_similar_transcripts("   \n  ", 0, 0.8)
            .await
            .unwrap_err();
        assert!(matches!(err, SamtalError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_wrapped_as_search_error() {
        let mut embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        embedder.fail = true;
        let coordinator =
            SearchCoordinator::new(Arc::new(embedder), Arc::new(MemoryVectorStore::new()));

        let err = coordinator
            .find_similar_transcripts("query", 0, 0.8)
            .await
            .unwrap_err();
        match err {
            SamtalError::Search(message) => assert!(message.contains("Query embedding failed")),
            other => panic!("expected search error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_matches_is_ok_and_empty() {
        let embedder = Arc::new(FakeEmbedder::returning(vec![1.0, 0.0]));
        let store = Arc::new(MemoryVectorStore::new());
        store
            .upsert(&EmbeddingRecord::new("call", vec![0.0, 1.0], "orthogonal"))
            .await
            .unwrap();
        let coordinator = SearchCoordinator::new(embedder, store);

        let results = coordinator
            .find_similar_transcripts("query", 0, 0.8)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
