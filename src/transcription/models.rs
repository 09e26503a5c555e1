//! Data models for transcription.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A finished call transcript.
///
/// Utterances are stored in the order they were finalized by the speech
/// provider (insertion order is chronological order) and are never
/// reordered after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Stable identifier derived from the transcript content.
    pub id: String,
    /// Finalized utterances in chronological order.
    pub utterances: Vec<String>,
    /// BCP-47 language tag the call was transcribed in.
    pub language: String,
}

impl Transcript {
    /// Create a transcript from finalized utterances.
    pub fn new(utterances: Vec<String>, language: &str) -> Self {
        let id = derive_call_id(&utterances);
        Self {
            id,
            utterances,
            language: language.to_string(),
        }
    }

    /// All utterances joined with single spaces, the shape every analysis
    /// provider consumes.
    pub fn joined(&self) -> String {
        self.utterances.join(" ")
    }
}

/// Derive a stable call id from transcript content.
///
/// Uses a 16-hex-character SHA-256 prefix, which is stable across runs for
/// the same content and wide enough that collisions are not a practical
/// concern.
pub fn derive_call_id(utterances: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(utterances.join(" ").as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_id_is_stable() {
        let utterances = vec!["Hello.".to_string(), "Goodbye.".to_string()];
        let a = derive_call_id(&utterances);
        let b = derive_call_id(&utterances);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_call_id_changes_with_content() {
        let a = derive_call_id(&["Hello.".to_string()]);
        let b = derive_call_id(&["Hello!".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_transcript_preserves_order() {
        let transcript = Transcript::new(
            vec!["first".to_string(), "second".to_string(), "third".to_string()],
            "en-US",
        );
        assert_eq!(transcript.utterances, vec!["first", "second", "third"]);
        assert_eq!(transcript.joined(), "first second third");
    }
}
