//! Result shapes for transcript analyses.
//!
//! Field names use the hyphenated keys the downstream dashboard consumes
//! (`call-summary`, `sentiment-scores`, ...), so serde renames are part of
//! the contract here, not cosmetics.

use serde::{Deserialize, Serialize};

/// A single-field summary payload, serialized as `{"call-summary": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSummary {
    #[serde(rename = "call-summary")]
    pub call_summary: String,
}

impl CallSummary {
    pub fn new(call_summary: impl Into<String>) -> Self {
        Self {
            call_summary: call_summary.into(),
        }
    }
}

/// Confidence scores at document and sentence level.
///
/// Always carries exactly the keys `positive`, `neutral`, `negative`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Confidence scores for opinion targets and assessments, which have no
/// neutral component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarScores {
    pub positive: f64,
    pub negative: f64,
}

/// Document-level sentiment with per-sentence breakdown and mined opinions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: String,
    #[serde(rename = "sentiment-scores")]
    pub sentiment_scores: SentimentScores,
    pub sentences: Vec<SentenceSentiment>,
}

/// Sentiment for one sentence of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSentiment {
    pub text: String,
    pub sentiment: String,
    #[serde(rename = "sentiment-scores")]
    pub sentiment_scores: SentimentScores,
    pub mined_opinions: Vec<MinedOpinion>,
}

/// An opinion target mined from a sentence, with its assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinedOpinion {
    #[serde(rename = "target-text")]
    pub target_text: String,
    #[serde(rename = "target-sentiment")]
    pub target_sentiment: String,
    #[serde(rename = "sentiment-scores")]
    pub sentiment_scores: PolarScores,
    pub assessments: Vec<OpinionAssessment>,
}

/// One assessment of an opinion target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionAssessment {
    pub text: String,
    pub sentiment: String,
    #[serde(rename = "sentiment-scores")]
    pub sentiment_scores: PolarScores,
}

/// A recognized named entity, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub length: usize,
    pub offset: usize,
    #[serde(rename = "confidence-score")]
    pub confidence_score: f64,
}

/// Round a confidence score to two decimals for display stability.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_summary_serialization() {
        let summary = CallSummary::new("Guest asked about late checkout.");
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"call-summary": "Guest asked about late checkout."})
        );
    }

    #[test]
    fn test_sentiment_scores_have_exact_keys() {
        let scores = SentimentScores {
            positive: 0.91,
            neutral: 0.05,
            negative: 0.04,
        };
        let json = serde_json::to_value(&scores).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("positive"));
        assert!(obj.contains_key("neutral"));
        assert!(obj.contains_key("negative"));
    }

    #[test]
    fn test_assessment_scores_have_no_neutral() {
        let assessment = OpinionAssessment {
            text: "spotless".to_string(),
            sentiment: "positive".to_string(),
            sentiment_scores: PolarScores {
                positive: 0.99,
                negative: 0.01,
            },
        };
        let json = serde_json::to_value(&assessment).unwrap();
        let scores = json["sentiment-scores"].as_object().unwrap();
        assert!(scores.contains_key("positive"));
        assert!(scores.contains_key("negative"));
        assert!(!scores.contains_key("neutral"));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.128), 0.13);
        assert_eq!(round2(0.124999), 0.12);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn test_entity_serialization_uses_hyphenated_confidence() {
        let entity = NamedEntity {
            text: "Oslo".to_string(),
            category: "Location".to_string(),
            subcategory: Some("City".to_string()),
            length: 4,
            offset: 10,
            confidence_score: 0.98,
        };
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["confidence-score"], 0.98);
    }
}
