//! Vector store abstraction for Samtal.
//!
//! Provides a trait-based interface for different vector database backends.
//! Search semantics are shared by every backend: cosine similarity against
//! the query vector, results at or above the caller's threshold, sorted by
//! score descending with ties broken by insertion order, truncated to
//! `max_results` unless that is zero (unlimited).

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One embedded text stored in the vector database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Unique record ID, `{call_id}-{uuid}`.
    pub id: String,
    /// The call this record belongs to.
    pub call_id: String,
    /// Embedding vector.
    pub vector: Vec<f32>,
    /// The normalized text the vector was computed from.
    pub source_text: String,
    /// When this record was inserted.
    pub inserted_at: DateTime<Utc>,
}

impl EmbeddingRecord {
    /// Create a new record with a fresh ID.
    pub fn new(call_id: impl Into<String>, vector: Vec<f32>, source_text: impl Into<String>) -> Self {
        let call_id = call_id.into();
        Self {
            id: format!("{}-{}", call_id, Uuid::new_v4()),
            call_id,
            vector,
            source_text: source_text.into(),
            inserted_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched record.
    pub record: EmbeddingRecord,
    /// Cosine similarity against the query (higher is better).
    pub score: f32,
}

/// Summary information about an indexed call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedCall {
    /// Call ID.
    pub call_id: String,
    /// Number of embedding records for the call.
    pub record_count: u32,
    /// When the most recent record was inserted.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a record, replacing any existing record with the same ID
    /// in place.
    async fn upsert(&self, record: &EmbeddingRecord) -> Result<()>;

    /// Find records similar to the query vector.
    ///
    /// `max_results == 0` means unlimited. Records scoring below
    /// `min_similarity_score` are excluded before truncation.
    async fn search(
        &self,
        query_vector: &[f32],
        max_results: usize,
        min_similarity_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete all records for a call. Returns how many were removed.
    async fn delete_by_call_id(&self, call_id: &str) -> Result<usize>;

    /// List indexed calls with record counts.
    async fn list_calls(&self) -> Result<Vec<IndexedCall>>;

    /// Get total record count.
    async fn record_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Rank raw (record, score) pairs: threshold, stable sort by score
/// descending, truncate. Shared by the backends so ordering rules cannot
/// drift between them.
pub(crate) fn rank_results(
    mut scored: Vec<SearchResult>,
    max_results: usize,
    min_similarity_score: f32,
) -> Vec<SearchResult> {
    scored.retain(|r| r.score >= min_similarity_score);
    // Stable sort keeps insertion order for equal scores.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    if max_results > 0 {
        scored.truncate(max_results);
    }
    scored
}
