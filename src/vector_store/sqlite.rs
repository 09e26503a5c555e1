//! SQLite-based vector store implementation.
//!
//! Cosine similarity is computed in Rust over all rows. For large datasets
//! consider the sqlite-vec extension or a dedicated vector database.
//!
//! Rows are scanned in rowid order during search, and upserts preserve the
//! rowid of a replaced record, so score ties resolve to insertion order
//! just like the in-memory backend.

use super::{cosine_similarity, rank_results, EmbeddingRecord, IndexedCall, SearchResult, VectorStore};
use crate::error::{Result, SamtalError};
use crate::transcription::Transcript;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS embeddings (
    id TEXT PRIMARY KEY,
    call_id TEXT NOT NULL,
    vector BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    source_text TEXT NOT NULL,
    inserted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_embeddings_call_id ON embeddings(call_id);

CREATE TABLE IF NOT EXISTS transcripts (
    call_id TEXT PRIMARY KEY,
    utterances_json TEXT NOT NULL,
    language TEXT NOT NULL,
    transcribed_at TEXT NOT NULL
);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SamtalError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize a vector to little-endian bytes.
    fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
        vector.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize a vector from little-endian bytes.
    fn bytes_to_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    /// Dimensionality of the stored vectors, if any exist.
    fn stored_dimensions(conn: &Connection) -> Result<Option<usize>> {
        let dims = conn.query_row("SELECT dimensions FROM embeddings LIMIT 1", [], |row| {
            row.get::<_, i64>(0)
        });
        match dims {
            Ok(d) => Ok(Some(d as usize)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn upsert(&self, record: &EmbeddingRecord) -> Result<()> {
        let conn = self.lock_conn()?;

        if let Some(dims) = Self::stored_dimensions(&conn)? {
            if record.vector.len() != dims {
                return Err(SamtalError::VectorStore(format!(
                    "Dimension mismatch: store holds {}-dimensional vectors, got {}",
                    dims,
                    record.vector.len()
                )));
            }
        }

        // ON CONFLICT instead of INSERT OR REPLACE so a replaced row keeps
        // its rowid, and with it its tie-break position.
        conn.execute(
            r#"
            INSERT INTO embeddings (id, call_id, vector, dimensions, source_text, inserted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                call_id = excluded.call_id,
                vector = excluded.vector,
                dimensions = excluded.dimensions,
                source_text = excluded.source_text,
                inserted_at = excluded.inserted_at
            "#,
            params![
                record.id,
                record.call_id,
                Self::vector_to_bytes(&record.vector),
                record.vector.len() as i64,
                record.source_text,
                record.inserted_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted embedding record {}", record.id);
        Ok(())
    }

    #[instrument(skip(self, query_vector))]
    async fn search(
        &self,
        query_vector: &[f32],
        max_results: usize,
        min_similarity_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock_conn()?;

        if let Some(dims) = Self::stored_dimensions(&conn)? {
            if query_vector.len() != dims {
                return Err(SamtalError::VectorStore(format!(
                    "Dimension mismatch: store holds {}-dimensional vectors, query has {}",
                    dims,
                    query_vector.len()
                )));
            }
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT id, call_id, vector, source_text, inserted_at
            FROM embeddings
            ORDER BY rowid
            "#,
        )?;

        let records = stmt.query_map([], |row| {
            let vector_bytes: Vec<u8> = row.get(2)?;
            let inserted_at_str: String = row.get(4)?;
            Ok(EmbeddingRecord {
                id: row.get(0)?,
                call_id: row.get(1)?,
                vector: Self::bytes_to_vector(&vector_bytes),
                source_text: row.get(3)?,
                inserted_at: DateTime::parse_from_rfc3339(&inserted_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let mut scored = Vec::new();
        for record in records {
            let record = record?;
            scored.push(SearchResult {
                score: cosine_similarity(query_vector, &record.vector),
                record,
            });
        }

        let results = rank_results(scored, max_results, min_similarity_score);
        debug!("Found {} matching records", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_call_id(&self, call_id: &str) -> Result<usize> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            "DELETE FROM embeddings WHERE call_id = ?1",
            params![call_id],
        )?;
        info!("Deleted {} records for call {}", deleted, call_id);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_calls(&self) -> Result<Vec<IndexedCall>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT call_id, COUNT(*) as record_count, MAX(inserted_at) as indexed_at
            FROM embeddings
            GROUP BY call_id
            ORDER BY indexed_at DESC
            "#,
        )?;

        let calls = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(2)?;
            Ok(IndexedCall {
                call_id: row.get(0)?,
                record_count: row.get(1)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        calls
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Into::into)
    }

    async fn record_count(&self) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// Transcript storage methods (not part of VectorStore trait)
impl SqliteVectorStore {
    /// Store a finished transcript, replacing any earlier one for the call.
    pub fn store_transcript(&self, transcript: &Transcript) -> Result<()> {
        let conn = self.lock_conn()?;

        let utterances_json = serde_json::to_string(&transcript.utterances)?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO transcripts (call_id, utterances_json, language, transcribed_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                transcript.id,
                utterances_json,
                transcript.language,
                Utc::now().to_rfc3339(),
            ],
        )?;

        info!("Stored transcript for call {}", transcript.id);
        Ok(())
    }

    /// Retrieve a stored transcript by call ID.
    pub fn get_transcript(&self, call_id: &str) -> Result<Option<Transcript>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            "SELECT utterances_json, language FROM transcripts WHERE call_id = ?1",
            params![call_id],
            |row| {
                let json: String = row.get(0)?;
                let language: String = row.get(1)?;
                Ok((json, language))
            },
        );

        match result {
            Ok((json, language)) => {
                let utterances: Vec<String> = serde_json::from_str(&json)?;
                Ok(Some(Transcript {
                    id: call_id.to_string(),
                    utterances,
                    language,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List stored transcripts as (call_id, utterance_count) pairs, newest
    /// first.
    pub fn list_transcripts(&self) -> Result<Vec<(String, usize)>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            "SELECT call_id, utterances_json FROM transcripts ORDER BY transcribed_at DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let call_id: String = row.get(0)?;
            let json: String = row.get(1)?;
            Ok((call_id, json))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (call_id, json) = row?;
            let utterances: Vec<String> = serde_json::from_str(&json)?;
            result.push((call_id, utterances.len()));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_search_delete() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let record = EmbeddingRecord::new("call1", vec![1.0, 0.0, 0.0], "hello there");
        store.upsert(&record).await.unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 0, 0.0).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].record.source_text, "hello there");

        assert_eq!(store.delete_by_call_id("call1").await.unwrap(), 1);
        assert_eq!(store.record_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_threshold_and_limit() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let with_sim = |c: f32| vec![c, (1.0 - c * c).sqrt()];

        for (call, sim) in [("a", 0.95f32), ("b", 0.80), ("c", 0.60)] {
            store
                .upsert(&EmbeddingRecord::new(call, with_sim(sim), "t"))
                .await
                .unwrap();
        }

        let results = store.search(&[1.0, 0.0], 0, 0.75).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.call_id, "a");

        let capped = store.search(&[1.0, 0.0], 1, 0.0).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn test_tie_break_survives_replacement() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let mut first = EmbeddingRecord::new("first", vec![1.0, 0.0], "old");
        store.upsert(&first).await.unwrap();
        store
            .upsert(&EmbeddingRecord::new("second", vec![1.0, 0.0], "t"))
            .await
            .unwrap();

        // Replacing the first record must not move it behind the second.
        first.source_text = "new".to_string();
        store.upsert(&first).await.unwrap();

        let results = store.search(&[1.0, 0.0], 0, 0.0).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.call_id, "first");
        assert_eq!(results[0].record.source_text, "new");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .upsert(&EmbeddingRecord::new("a", vec![1.0, 0.0], "t"))
            .await
            .unwrap();

        let err = store
            .upsert(&EmbeddingRecord::new("b", vec![1.0, 0.0, 0.0], "t"))
            .await
            .unwrap_err();
        assert!(matches!(err, SamtalError::VectorStore(_)));

        let err = store.search(&[1.0], 0, 0.0).await.unwrap_err();
        assert!(matches!(err, SamtalError::VectorStore(_)));
    }

    #[test]
    fn test_transcript_store_and_list() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let transcript = Transcript::new(
            vec!["Hello.".to_string(), "I need a room.".to_string()],
            "en-US",
        );

        store.store_transcript(&transcript).unwrap();

        let loaded = store.get_transcript(&transcript.id).unwrap().unwrap();
        assert_eq!(loaded.utterances, transcript.utterances);
        assert_eq!(loaded.language, "en-US");

        assert!(store.get_transcript("missing").unwrap().is_none());

        let listed = store.list_transcripts().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0, transcript.id);
        assert_eq!(listed[0].1, 2);
    }

    #[tokio::test]
    async fn test_file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vectors.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store
                .upsert(&EmbeddingRecord::new("call", vec![1.0, 0.0], "persisted"))
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(store.record_count().await.unwrap(), 1);
        let results = store.search(&[1.0, 0.0], 0, 0.0).await.unwrap();
        assert_eq!(results[0].record.source_text, "persisted");
    }

    #[tokio::test]
    async fn test_undecodable_row_fails_the_search() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store
                .upsert(&EmbeddingRecord::new("call", vec![1.0, 0.0], "fine"))
                .await
                .unwrap();
        }

        // A row whose source_text is a blob cannot be decoded as text.
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            r#"
            INSERT INTO embeddings (id, call_id, vector, dimensions, source_text, inserted_at)
            VALUES ('bad', 'call', x'0000803f00000000', 2, x'c0', '2026-01-01T00:00:00+00:00')
            "#,
            [],
        )
        .unwrap();
        drop(conn);

        let store = SqliteVectorStore::new(&path).unwrap();
        let err = store.search(&[1.0, 0.0], 0, 0.0).await.unwrap_err();
        assert!(matches!(err, SamtalError::Database(_)));
    }

    #[tokio::test]
    async fn test_list_calls_groups_by_call() {
        let store = SqliteVectorStore::in_memory().unwrap();
        for _ in 0..2 {
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
        assert_eq!(a.record_count, 2);
    }
}
