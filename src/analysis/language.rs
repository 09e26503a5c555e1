//! Text-analytics (language service) client.
//!
//! The language service accepts a document batch plus an analysis kind and
//! returns per-document results, each possibly flagged as an error with a
//! code and message. Per-document errors map to
//! [`SamtalError::AnalysisProvider`] so callers can treat them as
//! recoverable, scoped to the one analysis that failed.

use super::models::{
    round2, MinedOpinion, NamedEntity, OpinionAssessment, PolarScores, SentenceSentiment,
    SentimentAnalysis, SentimentScores,
};
use crate::error::{Result, SamtalError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Contract for the external text-analytics provider.
#[async_trait]
pub trait TextAnalytics: Send + Sync {
    /// Extract up to `max_sentence_count` key sentences verbatim.
    async fn extractive_summary(
        &self,
        document: &str,
        max_sentence_count: u32,
    ) -> Result<Vec<String>>;

    /// Generate a `sentence_count`-sentence summary in new words.
    async fn abstractive_summary(&self, document: &str, sentence_count: u32)
        -> Result<Vec<String>>;

    /// Document and sentence sentiment with opinion mining.
    async fn analyze_sentiment(&self, document: &str) -> Result<SentimentAnalysis>;

    /// Named entity recognition, preserving provider order.
    async fn recognize_entities(&self, document: &str) -> Result<Vec<NamedEntity>>;
}

/// HTTP client for a language service endpoint.
pub struct LanguageServiceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    language: String,
}

impl LanguageServiceClient {
    /// Create a client for the given endpoint and key.
    pub fn new(endpoint: &str, api_key: &str, language: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: language.to_string(),
        }
    }

    /// Issue one analyze-text request and unwrap the single document
    /// result, surfacing per-document errors.
    #[instrument(skip(self, document, parameters), fields(kind = kind))]
    async fn analyze<T: for<'de> Deserialize<'de>>(
        &self,
        kind: &'static str,
        parameters: serde_json::Value,
        document: &str,
    ) -> Result<T> {
        let url = format!("{}/analyze-text", self.endpoint);
        let request = AnalyzeRequest {
            kind,
            parameters,
            documents: vec![DocumentInput {
                id: "1",
                language: &self.language,
                text: document,
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: AnalyzeResponse<T> = response.json().await?;

        if let Some(entry) = body.errors.into_iter().next() {
            return Err(SamtalError::AnalysisProvider {
                code: entry.error.code,
                message: entry.error.message,
            });
        }

        body.documents
            .into_iter()
            .next()
            .ok_or_else(|| SamtalError::AnalysisProvider {
                code: "emptyResponse".to_string(),
                message: "provider returned no document results".to_string(),
            })
    }
}

#[async_trait]
impl TextAnalytics for LanguageServiceClient {
    async fn extractive_summary(
        &self,
        document: &str,
        max_sentence_count: u32,
    ) -> Result<Vec<String>> {
        let result: ExtractiveResult = self
            .analyze(
                "ExtractiveSummarization",
                serde_json::json!({ "sentenceCount": max_sentence_count }),
                document,
            )
            .await?;

        debug!("Extracted {} sentences", result.sentences.len());
        Ok(result.sentences.into_iter().map(|s| s.text).collect())
    }

    async fn abstractive_summary(
        &self,
        document: &str,
        sentence_count: u32,
    ) -> Result<Vec<String>> {
        let result: AbstractiveResult = self
            .analyze(
                "AbstractiveSummarization",
                serde_json::json!({ "sentenceCount": sentence_count }),
                document,
            )
            .await?;

        debug!("Generated {} summary sentences", result.summaries.len());
        Ok(result.summaries.into_iter().map(|s| s.text).collect())
    }

    async fn analyze_sentiment(&self, document: &str) -> Result<SentimentAnalysis> {
        let result: SentimentResult = self
            .analyze(
                "SentimentAnalysis",
                serde_json::json!({ "opinionMining": true }),
                document,
            )
            .await?;

        Ok(SentimentAnalysis {
            sentiment: result.sentiment,
            sentiment_scores: result.confidence_scores.rounded(),
            sentences: result
                .sentences
                .into_iter()
                .map(|sentence| SentenceSentiment {
                    text: sentence.text,
                    sentiment: sentence.sentiment,
                    sentiment_scores: sentence.confidence_scores.rounded(),
                    mined_opinions: sentence
                        .mined_opinions
                        .into_iter()
                        .map(|opinion| MinedOpinion {
                            target_text: opinion.target.text,
                            target_sentiment: opinion.target.sentiment,
                            sentiment_scores: opinion.target.confidence_scores.rounded_polar(),
                            assessments: opinion
                                .assessments
                                .into_iter()
                                .map(|a| OpinionAssessment {
                                    text: a.text,
                                    sentiment: a.sentiment,
                                    sentiment_scores: a.confidence_scores.rounded_polar(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        })
    }

    async fn recognize_entities(&self, document: &str) -> Result<Vec<NamedEntity>> {
        let result: EntitiesResult = self
            .analyze("EntityRecognition", serde_json::json!({}), document)
            .await?;

        Ok(result
            .entities
            .into_iter()
            .map(|e| NamedEntity {
                text: e.text,
                category: e.category,
                subcategory: e.subcategory,
                length: e.length,
                offset: e.offset,
                confidence_score: e.confidence_score,
            })
            .collect())
    }
}

// === Wire types ===

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    kind: &'static str,
    parameters: serde_json::Value,
    documents: Vec<DocumentInput<'a>>,
}

#[derive(Serialize)]
struct DocumentInput<'a> {
    id: &'a str,
    language: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse<T> {
    #[serde(default = "Vec::new")]
    documents: Vec<T>,
    #[serde(default)]
    errors: Vec<DocumentErrorEntry>,
}

#[derive(Deserialize)]
struct DocumentErrorEntry {
    #[allow(dead_code)]
    id: String,
    error: DocumentError,
}

#[derive(Deserialize)]
struct DocumentError {
    code: String,
    message: String,
}

#[derive(Deserialize)]
struct ExtractiveResult {
    sentences: Vec<WireSentenceText>,
}

#[derive(Deserialize)]
struct AbstractiveResult {
    summaries: Vec<WireSentenceText>,
}

#[derive(Deserialize)]
struct WireSentenceText {
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentResult {
    sentiment: String,
    confidence_scores: WireScores,
    sentences: Vec<WireSentence>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSentence {
    text: String,
    sentiment: String,
    confidence_scores: WireScores,
    #[serde(default)]
    mined_opinions: Vec<WireOpinion>,
}

#[derive(Deserialize)]
struct WireOpinion {
    target: WireTarget,
    #[serde(default)]
    assessments: Vec<WireTarget>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTarget {
    text: String,
    sentiment: String,
    confidence_scores: WireScores,
}

#[derive(Deserialize, Default)]
struct WireScores {
    #[serde(default)]
    positive: f64,
    #[serde(default)]
    neutral: f64,
    #[serde(default)]
    negative: f64,
}

impl WireScores {
    fn rounded(&self) -> SentimentScores {
        SentimentScores {
            positive: round2(self.positive),
            neutral: round2(self.neutral),
            negative: round2(self.negative),
        }
    }

    fn rounded_polar(&self) -> PolarScores {
        PolarScores {
            positive: round2(self.positive),
            negative: round2(self.negative),
        }
    }
}

#[derive(Deserialize)]
struct EntitiesResult {
    entities: Vec<WireEntity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntity {
    text: String,
    category: String,
    #[serde(default)]
    subcategory: Option<String>,
    length: usize,
    offset: usize,
    confidence_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_wire_mapping_rounds_scores() {
        let wire = SentimentResult {
            sentiment: "positive".to_string(),
            confidence_scores: WireScores {
                positive: 0.912345,
                neutral: 0.054321,
                negative: 0.033334,
            },
            sentences: vec![],
        };
        let rounded = wire.confidence_scores.rounded();
        assert_eq!(rounded.positive, 0.91);
        assert_eq!(rounded.neutral, 0.05);
        assert_eq!(rounded.negative, 0.03);
    }

    #[test]
    fn test_error_entry_deserialization() {
        let json = r#"{
            "documents": [],
            "errors": [{"id": "1", "error": {"code": "InvalidDocument", "message": "too long"}}]
        }"#;
        let response: AnalyzeResponse<ExtractiveResult> = serde_json::from_str(json).unwrap();
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].error.code, "InvalidDocument");
    }

    #[test]
    fn test_entity_wire_deserialization() {
        let json = r#"{
            "entities": [
                {"text": "Aruba", "category": "Location", "length": 5, "offset": 20, "confidenceScore": 0.97}
            ]
        }"#;
        let result: EntitiesResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.entities[0].text, "Aruba");
        assert!(result.entities[0].subcategory.is_none());
    }
}
