//! Transcript analysis orchestration.
//!
//! Six independent analyses run against a finished transcript. Provider
//! calls are costly and potentially non-deterministic, so the orchestrator
//! memoizes results per `(transcript_id, kind, parameters)` key: asking
//! twice returns the cached value, never a recomputation. A provider
//! failure for one kind is scoped to that kind and never blocks the rest.

mod chat;
mod compliance;
mod language;
mod models;

pub use chat::{ChatProvider, OpenAiChatProvider};
pub use compliance::{build_compliance_prompt, ComplianceFlags};
pub use language::{LanguageServiceClient, TextAnalytics};
pub use models::{
    CallSummary, MinedOpinion, NamedEntity, OpinionAssessment, PolarScores, SentenceSentiment,
    SentimentAnalysis, SentimentScores,
};

use crate::config::Prompts;
use crate::error::{Result, SamtalError};
use crate::transcription::Transcript;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Summaries are capped at two sentences in both summary styles.
const SUMMARY_SENTENCE_COUNT: u32 = 2;

/// The closed set of transcript analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Compliance,
    ExtractiveSummary,
    AbstractiveSummary,
    QuerySummary,
    SentimentAndOpinions,
    Entities,
}

impl std::str::FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compliance" => Ok(AnalysisKind::Compliance),
            "extractive-summary" | "extractive" => Ok(AnalysisKind::ExtractiveSummary),
            "abstractive-summary" | "abstractive" => Ok(AnalysisKind::AbstractiveSummary),
            "query-summary" | "query" => Ok(AnalysisKind::QuerySummary),
            "sentiment" | "sentiment-and-opinions" => Ok(AnalysisKind::SentimentAndOpinions),
            "entities" => Ok(AnalysisKind::Entities),
            _ => Err(format!("Unknown analysis kind: {}", s)),
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnalysisKind::Compliance => "compliance",
            AnalysisKind::ExtractiveSummary => "extractive-summary",
            AnalysisKind::AbstractiveSummary => "abstractive-summary",
            AnalysisKind::QuerySummary => "query-summary",
            AnalysisKind::SentimentAndOpinions => "sentiment-and-opinions",
            AnalysisKind::Entities => "entities",
        };
        write!(f, "{}", name)
    }
}

/// Per-kind analysis parameters. Part of the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AnalysisParams {
    #[default]
    None,
    Compliance(ComplianceFlags),
}

/// Cache key for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisRequest {
    pub transcript_id: String,
    pub kind: AnalysisKind,
    pub params: AnalysisParams,
}

/// Result of one analysis, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    /// Raw textual answer to the compliance questions.
    Compliance(String),
    ExtractiveSummary(CallSummary),
    AbstractiveSummary(CallSummary),
    /// Raw model output, JSON-shaped with `call-title` and `call-summary`.
    QuerySummary(String),
    SentimentAndOpinions(SentimentAnalysis),
    Entities(Vec<NamedEntity>),
}

/// Dispatches analyses to the chat and text-analytics providers, memoizing
/// results per request key.
pub struct AnalysisOrchestrator {
    chat: Arc<dyn ChatProvider>,
    text_analytics: Arc<dyn TextAnalytics>,
    prompts: Prompts,
    cache: Mutex<HashMap<AnalysisRequest, AnalysisResult>>,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator over the given providers.
    pub fn new(
        chat: Arc<dyn ChatProvider>,
        text_analytics: Arc<dyn TextAnalytics>,
        prompts: Prompts,
    ) -> Self {
        Self {
            chat,
            text_analytics,
            prompts,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Run one analysis, returning the cached result if this exact
    /// request was already answered.
    ///
    /// The cache lock is held across the provider call, so two
    /// logically-identical requests resolve to one underlying call.
    #[instrument(skip(self, transcript), fields(call_id = %transcript.id, kind = %kind))]
    pub async fn analyze(
        &self,
        transcript: &Transcript,
        kind: AnalysisKind,
        params: AnalysisParams,
    ) -> Result<AnalysisResult> {
        validate_params(kind, &params)?;

        let request = AnalysisRequest {
            transcript_id: transcript.id.clone(),
            kind,
            params,
        };

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(&request) {
            debug!("Analysis cache hit");
            return Ok(cached.clone());
        }

        let result = self.run(transcript, &request).await?;
        cache.insert(request, result.clone());
        Ok(result)
    }

    async fn run(&self, transcript: &Transcript, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let document = transcript.joined();

        match (request.kind, &request.params) {
            (AnalysisKind::Compliance, AnalysisParams::Compliance(flags)) => {
                let system = build_compliance_prompt(&self.prompts, *flags);
                let answer = self.chat.complete(&system, &document).await?;
                Ok(AnalysisResult::Compliance(answer))
            }
            (AnalysisKind::ExtractiveSummary, _) => {
                let summary = self
                    .summarize(|| async {
                        self.text_analytics
                            .extractive_summary(&document, SUMMARY_SENTENCE_COUNT)
                            .await
                    })
                    .await?;
                Ok(AnalysisResult::ExtractiveSummary(summary))
            }
            (AnalysisKind::AbstractiveSummary, _) => {
                let summary = self
                    .summarize(|| async {
                        self.text_analytics
                            .abstractive_summary(&document, SUMMARY_SENTENCE_COUNT)
                            .await
                    })
                    .await?;
                Ok(AnalysisResult::AbstractiveSummary(summary))
            }
            (AnalysisKind::QuerySummary, _) => {
                let answer = self
                    .chat
                    .complete(&self.prompts.query_summary.system, &document)
                    .await?;
                Ok(AnalysisResult::QuerySummary(answer))
            }
            (AnalysisKind::SentimentAndOpinions, _) => {
                let sentiment = self.text_analytics.analyze_sentiment(&document).await?;
                Ok(AnalysisResult::SentimentAndOpinions(sentiment))
            }
            (AnalysisKind::Entities, _) => {
                let entities = self.text_analytics.recognize_entities(&document).await?;
                Ok(AnalysisResult::Entities(entities))
            }
            (AnalysisKind::Compliance, _) => unreachable!("validated above"),
        }
    }

    /// Run a summary action. A per-document provider error degrades to an
    /// empty summary with a warning, so one bad summary never aborts the
    /// other analyses.
    async fn summarize<F, Fut>(&self, action: F) -> Result<CallSummary>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<String>>>,
    {
        match action().await {
            Ok(sentences) => Ok(CallSummary::new(sentences.join(" "))),
            Err(SamtalError::AnalysisProvider { code, message }) => {
                warn!("Summary action failed with code {:?}: {}", code, message);
                Ok(CallSummary::new(""))
            }
            Err(e) => Err(e),
        }
    }
}

fn validate_params(kind: AnalysisKind, params: &AnalysisParams) -> Result<()> {
    match (kind, params) {
        (AnalysisKind::Compliance, AnalysisParams::Compliance(_)) => Ok(()),
        (AnalysisKind::Compliance, _) => Err(SamtalError::InvalidInput(
            "compliance analysis requires compliance flags".to_string(),
        )),
        (_, AnalysisParams::Compliance(_)) => Err(SamtalError::InvalidInput(format!(
            "compliance flags are not valid for {} analysis",
            kind
        ))),
        _ => Ok(()),
    }
}
