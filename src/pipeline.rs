//! End-to-end call pipeline for Samtal.
//!
//! Wires the components together: audio decoding, transcription, analysis,
//! embedding, and indexing. Each stage can also be driven separately
//! through the CLI or the HTTP API.

use crate::analysis::{
    AnalysisKind, AnalysisOrchestrator, AnalysisParams, AnalysisResult, LanguageServiceClient,
    OpenAiChatProvider,
};
use crate::audio::PcmAudio;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SamtalError};
use crate::search::SearchCoordinator;
use crate::text::normalize;
use crate::transcription::{ConversationTranscriber, SpeechProvider, Transcript, WhisperSpeechProvider};
use crate::vector_store::{EmbeddingRecord, SearchResult, SqliteVectorStore, VectorStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// How a call's transcript is turned into embedding records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// One record per utterance.
    PerUtterance,
    /// One record for the whole call, utterances joined.
    WholeCall,
}

/// The main pipeline for processing recorded calls.
pub struct CallPipeline {
    settings: Settings,
    transcriber: ConversationTranscriber,
    analyses: AnalysisOrchestrator,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<SqliteVectorStore>,
    search: SearchCoordinator,
}

impl CallPipeline {
    /// Create a pipeline with providers built from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let provider: Arc<dyn SpeechProvider> =
            Arc::new(WhisperSpeechProvider::with_model(&settings.speech.model));
        let transcriber = ConversationTranscriber::with_timing(
            provider,
            Duration::from_millis(settings.speech.poll_interval_ms),
            Duration::from_secs(settings.speech.session_deadline_seconds),
        );

        let analyses = AnalysisOrchestrator::new(
            Arc::new(OpenAiChatProvider::new(&settings.chat.model)),
            Arc::new(LanguageServiceClient::new(
                &settings.language_service.endpoint,
                &settings.language_service.api_key,
                &settings.language_service.language,
            )),
            prompts,
        );

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let vector_store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
        let search = SearchCoordinator::new(
            embedder.clone(),
            vector_store.clone() as Arc<dyn VectorStore>,
        );

        std::fs::create_dir_all(settings.data_dir())?;

        Ok(Self {
            settings,
            transcriber,
            analyses,
            embedder,
            vector_store,
            search,
        })
    }

    /// Create a pipeline with custom components, for tests and embedding
    /// in other services.
    pub fn with_components(
        settings: Settings,
        transcriber: ConversationTranscriber,
        analyses: AnalysisOrchestrator,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<SqliteVectorStore>,
    ) -> Self {
        let search = SearchCoordinator::new(
            embedder.clone(),
            vector_store.clone() as Arc<dyn VectorStore>,
        );
        Self {
            settings,
            transcriber,
            analyses,
            embedder,
            vector_store,
            search,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the SQLite store (for transcript access).
    pub fn store(&self) -> Arc<SqliteVectorStore> {
        self.vector_store.clone()
    }

    /// Get the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Transcribe a recorded call from WAV bytes and persist the result.
    #[instrument(skip(self, wav_bytes), fields(bytes = wav_bytes.len()))]
    pub async fn transcribe_call(&self, wav_bytes: &[u8]) -> Result<Transcript> {
        let audio = PcmAudio::from_wav_bytes(wav_bytes)?;
        info!("Decoded {:.1}s of audio", audio.duration_seconds());

        let transcript = self
            .transcriber
            .transcribe(audio, &self.settings.speech.language)
            .await?;
        info!(
            "Transcribed call {} with {} utterances",
            transcript.id,
            transcript.utterances.len()
        );

        self.vector_store.store_transcript(&transcript)?;
        Ok(transcript)
    }

    /// Run one analysis over a transcript, memoized per request.
    pub async fn analyze_call(
        &self,
        transcript: &Transcript,
        kind: AnalysisKind,
        params: AnalysisParams,
    ) -> Result<AnalysisResult> {
        self.analyses.analyze(transcript, kind, params).await
    }

    /// Embed a transcript into the vector store. Returns how many records
    /// were written.
    #[instrument(skip(self, transcript), fields(call_id = %transcript.id))]
    pub async fn embed_call(&self, transcript: &Transcript, mode: EmbeddingMode) -> Result<usize> {
        let texts: Vec<String> = match mode {
            EmbeddingMode::PerUtterance => transcript
                .utterances
                .iter()
                .map(|u| normalize(u))
                .filter(|u| !u.is_empty())
                .collect(),
            EmbeddingMode::WholeCall => {
                let joined = normalize(&transcript.joined());
                if joined.is_empty() {
                    Vec::new()
                } else {
                    vec![joined]
                }
            }
        };

        if texts.is_empty() {
            warn!("Transcript {} has no embeddable text", transcript.id);
            return Ok(0);
        }

        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(SamtalError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        // Re-embedding replaces the call's old records rather than
        // accumulating duplicates. The delete happens only once the new
        // embeddings are in hand, so a provider failure leaves the
        // previously indexed records searchable.
        let removed = self.vector_store.delete_by_call_id(&transcript.id).await?;
        if removed > 0 {
            info!("Replaced {} existing records for call {}", removed, transcript.id);
        }

        for (text, vector) in texts.iter().zip(vectors) {
            let record = EmbeddingRecord::new(transcript.id.clone(), vector, text.clone());
            self.vector_store.upsert(&record).await?;
        }

        info!("Indexed {} records for call {}", texts.len(), transcript.id);
        Ok(texts.len())
    }

    /// Search indexed calls for segments similar to the query.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        min_similarity_score: f32,
    ) -> Result<Vec<SearchResult>> {
        self.search
            .find_similar_transcripts(query, max_results, min_similarity_score)
            .await
    }

    /// Load a stored transcript by call ID.
    pub fn get_transcript(&self, call_id: &str) -> Result<Option<Transcript>> {
        self.vector_store.get_transcript(call_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TextAnalytics;
    use crate::analysis::{ChatProvider, NamedEntity, SentimentAnalysis};
    use crate::transcription::{SpeechEvent, SpeechProvider};
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct OneUtteranceProvider;

    #[async_trait]
    impl SpeechProvider for OneUtteranceProvider {
        async fn start_session(
            &self,
            _audio: PcmAudio,
            _language: &str,
        ) -> Result<mpsc::Receiver<SpeechEvent>> {
            let (tx, rx) = mpsc::channel(8);
            tokio::spawn(async move {
                let _ = tx.send(SpeechEvent::SessionStarted).await;
                let _ = tx
                    .send(SpeechEvent::UtteranceFinalized(
                        "I would like to  book a room..".to_string(),
                    ))
                    .await;
                let _ = tx.send(SpeechEvent::SessionStopped).await;
            });
            Ok(rx)
        }
    }

    struct StubChat;

    #[async_trait]
    impl ChatProvider for StubChat {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok("No vulgarity detected.".to_string())
        }
    }

    struct StubAnalytics;

    #[async_trait]
    impl TextAnalytics for StubAnalytics {
        async fn extractive_summary(&self, _d: &str, _n: u32) -> Result<Vec<String>> {
            Ok(vec!["Key sentence.".to_string()])
        }
        async fn abstractive_summary(&self, _d: &str, _n: u32) -> Result<Vec<String>> {
            Ok(vec!["Summary.".to_string()])
        }
        async fn analyze_sentiment(&self, _d: &str) -> Result<SentimentAnalysis> {
            unimplemented!("not exercised")
        }
        async fn recognize_entities(&self, _d: &str) -> Result<Vec<NamedEntity>> {
            Ok(vec![])
        }
    }

    struct UnitEmbedder;

    #[async_trait]
    impl Embedder for UnitEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
        fn dimensions(&self) -> usize {
            2
        }
    }

    struct FailsAfterFirstBatch {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Embedder for FailsAfterFirstBatch {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call == 0 {
                Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
            } else {
                Err(SamtalError::Embedding("provider unavailable".to_string()))
            }
        }
        fn dimensions(&self) -> usize {
            2
        }
    }

    fn test_pipeline() -> CallPipeline {
        let settings = Settings::default();
        let transcriber = ConversationTranscriber::new(Arc::new(OneUtteranceProvider));
        let analyses = AnalysisOrchestrator::new(
            Arc::new(StubChat),
            Arc::new(StubAnalytics),
            Prompts::default(),
        );
        CallPipeline::with_components(
            settings,
            transcriber,
            analyses,
            Arc::new(UnitEmbedder),
            Arc::new(SqliteVectorStore::in_memory().unwrap()),
        )
    }

    fn test_wav() -> Vec<u8> {
        PcmAudio {
            samples: vec![0u8; 3200],
            sample_rate: 16_000,
            channels: 1,
            bits_per_sample: 16,
        }
        .to_wav_bytes()
    }

    #[tokio::test]
    async fn test_transcribe_persists_transcript() {
        let pipeline = test_pipeline();
        let transcript = pipeline.transcribe_call(&test_wav()).await.unwrap();

        assert_eq!(transcript.utterances.len(), 1);
        let stored = pipeline.get_transcript(&transcript.id).unwrap().unwrap();
        assert_eq!(stored.utterances, transcript.utterances);
    }

    #[tokio::test]
    async fn test_embed_call_normalizes_and_indexes() {
        let pipeline = test_pipeline();
        let transcript = pipeline.transcribe_call(&test_wav()).await.unwrap();

        let count = pipeline
            .embed_call(&transcript, EmbeddingMode::PerUtterance)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let results = pipeline.search("book a room", 0, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
        // Transcription artifacts are cleaned before indexing.
        assert_eq!(results[0].record.source_text, "I would like to book a room.");
    }

    #[tokio::test]
    async fn test_reembedding_replaces_records() {
        let pipeline = test_pipeline();
        let transcript = pipeline.transcribe_call(&test_wav()).await.unwrap();

        pipeline
            .embed_call(&transcript, EmbeddingMode::PerUtterance)
            .await
            .unwrap();
        pipeline
            .embed_call(&transcript, EmbeddingMode::WholeCall)
            .await
            .unwrap();

        let results = pipeline.search("book a room", 0, 0.0).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reembedding_keeps_existing_records() {
        let settings = Settings::default();
        let transcriber = ConversationTranscriber::new(Arc::new(OneUtteranceProvider));
        let analyses = AnalysisOrchestrator::new(
            Arc::new(StubChat),
            Arc::new(StubAnalytics),
            Prompts::default(),
        );
        let pipeline = CallPipeline::with_components(
            settings,
            transcriber,
            analyses,
            Arc::new(FailsAfterFirstBatch {
                calls: std::sync::atomic::AtomicUsize::new(0),
            }),
            Arc::new(SqliteVectorStore::in_memory().unwrap()),
        );
        let transcript = pipeline.transcribe_call(&test_wav()).await.unwrap();

        pipeline
            .embed_call(&transcript, EmbeddingMode::PerUtterance)
            .await
            .unwrap();

        let err = pipeline
            .embed_call(&transcript, EmbeddingMode::PerUtterance)
            .await
            .unwrap_err();
        assert!(matches!(err, SamtalError::Embedding(_)));

        // The first run's records stay indexed when re-embedding fails.
        assert_eq!(pipeline.store().record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_analyze_call_runs_compliance() {
        let pipeline = test_pipeline();
        let transcript = pipeline.transcribe_call(&test_wav()).await.unwrap();

        let result = pipeline
            .analyze_call(
                &transcript,
                AnalysisKind::Compliance,
                AnalysisParams::Compliance(Default::default()),
            )
            .await
            .unwrap();
        assert!(matches!(result, AnalysisResult::Compliance(_)));
    }
}
