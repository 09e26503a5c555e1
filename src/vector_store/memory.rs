//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets. Records live in a `Vec` so
//! insertion order is observable, which is what breaks score ties during
//! search.

use super::{cosine_similarity, rank_results, EmbeddingRecord, IndexedCall, SearchResult, VectorStore};
use crate::error::{Result, SamtalError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

struct Inner {
    records: Vec<EmbeddingRecord>,
    /// Dimensionality fixed by the first inserted record.
    dimensions: Option<usize>,
}

/// In-memory vector store.
pub struct MemoryVectorStore {
    inner: RwLock<Inner>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: Vec::new(),
                dimensions: None,
            }),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, record: &EmbeddingRecord) -> Result<()> {
        let mut inner = self.inner.write().unwrap();

        if let Some(dims) = inner.dimensions {
            if record.vector.len() != dims {
                return Err(SamtalError::VectorStore(format!(
                    "Dimension mismatch: store holds {}-dimensional vectors, got {}",
                    dims,
                    record.vector.len()
                )));
            }
        } else {
            inner.dimensions = Some(record.vector.len());
        }

        // Replacing in place keeps the record's original position for
        // tie-breaking.
        if let Some(existing) = inner.records.iter_mut().find(|r| r.id == record.id) {
            *existing = record.clone();
        } else {
            inner.records.push(record.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        max_results: usize,
        min_similarity_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let inner = self.inner.read().unwrap();

        if let Some(dims) = inner.dimensions {
            if query_vector.len() != dims {
                return Err(SamtalError::VectorStore(format!(
                    "Dimension mismatch: store holds {}-dimensional vectors, query has {}",
                    dims,
                    query_vector.len()
                )));
            }
        }

        let scored: Vec<SearchResult> = inner
            .records
            .iter()
            .map(|record| SearchResult {
                score: cosine_similarity(query_vector, &record.vector),
                record: record.clone(),
            })
            .collect();

        Ok(rank_results(scored, max_results, min_similarity_score))
    }

    async fn delete_by_call_id(&self, call_id: &str) -> Result<usize> {
        let mut inner = self.inner.write().unwrap();
        let initial_len = inner.records.len();
        inner.records.retain(|r| r.call_id != call_id);
        Ok(initial_len - inner.records.len())
    }

    async fn list_calls(&self) -> Result<Vec<IndexedCall>> {
        let inner = self.inner.read().unwrap();

        let mut call_map: HashMap<String, IndexedCall> = HashMap::new();
        for record in &inner.records {
            let entry = call_map
                .entry(record.call_id.clone())
                .or_insert_with(|| IndexedCall {
                    call_id: record.call_id.clone(),
                    record_count: 0,
                    indexed_at: record.inserted_at,
                });
            entry.record_count += 1;
            if record.inserted_at > entry.indexed_at {
                entry.indexed_at = record.inserted_at;
            }
        }

        let mut calls: Vec<IndexedCall> = call_map.into_values().collect();
        calls.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(calls)
    }

    async fn record_count(&self) -> Result<usize> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A unit vector at a known cosine similarity to `[1, 0]`.
    fn vector_with_similarity(c: f32) -> Vec<f32> {
        vec![c, (1.0 - c * c).sqrt()]
    }

    async fn store_with_scores(scores: &[f32]) -> MemoryVectorStore {
        let store = MemoryVectorStore::new();
        for (i, &score) in scores.iter().enumerate() {
            let record =
                EmbeddingRecord::new(format!("call{}", i), vector_with_similarity(score), "text");
            store.upsert(&record).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_search_thresholds_and_orders_by_score() {
        let store = store_with_scores(&[0.80, 0.60, 0.95]).await;

        let results = store.search(&[1.0, 0.0], 0, 0.75).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.call_id, "call2");
        assert_eq!(results[1].record.call_id, "call0");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_max_results_zero_is_unlimited() {
        let store = store_with_scores(&[0.9, 0.8, 0.7]).await;

        let unlimited = store.search(&[1.0, 0.0], 0, 0.0).await.unwrap();
        assert_eq!(unlimited.len(), 3);

        let capped = store.search(&[1.0, 0.0], 1, 0.0).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].record.call_id, "call0");
    }

    #[tokio::test]
    async fn test_equal_scores_preserve_insertion_order() {
        let store = MemoryVectorStore::new();
        for name in ["first", "second", "third"] {
            store
                .upsert(&EmbeddingRecord::new(name, vec![1.0, 0.0], "same"))
                .await
                .unwrap();
        }

        let results = store.search(&[1.0, 0.0], 0, 0.0).await.unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.record.call_id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected_and_store_unchanged() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&EmbeddingRecord::new("a", vec![1.0, 0.0], "ok"))
            .await
            .unwrap();

        let err = store
            .upsert(&EmbeddingRecord::new("b", vec![1.0, 0.0, 0.0], "bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, SamtalError::VectorStore(_)));
        assert_eq!(store.record_count().await.unwrap(), 1);

        let err = store.search(&[1.0], 0, 0.0).await.unwrap_err();
        assert!(matches!(err, SamtalError::VectorStore(_)));
    }

    #[tokio::test]
    async fn test_replace_by_id_keeps_position() {
        let store = MemoryVectorStore::new();
        let mut record = EmbeddingRecord::new("a", vec![1.0, 0.0], "old");
        store.upsert(&record).await.unwrap();
        store
            .upsert(&EmbeddingRecord::new("b", vec![1.0, 0.0], "other"))
            .await
            .unwrap();

        record.source_text = "new".to_string();
        store.upsert(&record).await.unwrap();

        assert_eq!(store.record_count().await.unwrap(), 2);
        let results = store.search(&[1.0, 0.0], 0, 0.0).await.unwrap();
        assert_eq!(results[0].record.source_text, "new");
        assert_eq!(results[1].record.call_id, "b");
    }

    #[tokio::test]
    async fn test_repeated_search_is_pure() {
        let store = store_with_scores(&[0.9, 0.8]).await;

        let first = store.search(&[1.0, 0.0], 0, 0.5).await.unwrap();
        let second = store.search(&[1.0, 0.0], 0, 0.5).await.unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.record, b.record);
            assert_eq!(a.score, b.score);
        }
    }

    #[tokio::test]
    async fn test_delete_and_list_calls() {
        let store = MemoryVectorStore::new();
        for _ in 0..3 {
            store
                .upsert(&EmbeddingRecord::new("call-a", vec![1.0, 0.0], "t"))
                .await
                .unwrap();
        }
        store
            .upsert(&EmbeddingRecord::new("call-b", vec![0.0, 1.0], "t"))
            .await
            .unwrap();

        let calls = store.list_calls().await.unwrap();
        assert_eq!(calls.len(), 2);
        let a = calls.iter().find(|c| c.call_id == "call-a").unwrap();
        assert_eq!(a.record_count, 3);

        assert_eq!(store.delete_by_call_id("call-a").await.unwrap(), 3);
        assert_eq!(store.record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_similarity_is_near_one() {
        let store = MemoryVectorStore::new();
        let vector = vec![0.3, 0.5, 0.8];
        store
            .upsert(&EmbeddingRecord::new("call", vector.clone(), "t"))
            .await
            .unwrap();

        let results = store.search(&vector, 0, 0.0).await.unwrap();
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }
}
