//! OpenAI Whisper-backed speech provider.
//!
//! Whisper's API is request/response rather than event-driven, so this
//! provider transcribes the whole recording and replays the resulting
//! segments as utterance-finalized events, ending with a stopped event.
//! API failures surface as a canceled session.

use super::{SpeechEvent, SpeechProvider};
use crate::audio::PcmAudio;
use crate::error::{Result, SamtalError};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Speech provider backed by the OpenAI Whisper API.
pub struct WhisperSpeechProvider {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl WhisperSpeechProvider {
    /// Create a provider with the default model.
    pub fn new() -> Self {
        Self::with_model("whisper-1")
    }

    /// Create a provider with a custom model.
    pub fn with_model(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }

    /// Run one transcription request and return the finalized utterances.
    #[instrument(skip(self, audio))]
    async fn transcribe_audio(&self, audio: &PcmAudio, language: &str) -> Result<Vec<String>> {
        let wav_bytes = audio.to_wav_bytes();

        let request = CreateTranscriptionRequestArgs::default()
            .file(async_openai::types::AudioInput::from_vec_u8(
                "call.wav".to_string(),
                wav_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson)
            // Whisper wants the bare ISO-639-1 code, not a full BCP-47 tag.
            .language(language.split('-').next().unwrap_or(language))
            .build()
            .map_err(|e| SamtalError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| SamtalError::OpenAI(format!("Whisper API error: {}", e)))?;

        let utterances: Vec<String> = response
            .segments
            .map(|segments| {
                segments
                    .iter()
                    .map(|s| s.text.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                let text = response.text.trim().to_string();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text]
                }
            });

        debug!("Whisper returned {} utterances", utterances.len());
        Ok(utterances)
    }
}

impl Default for WhisperSpeechProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechProvider for WhisperSpeechProvider {
    async fn start_session(
        &self,
        audio: PcmAudio,
        language: &str,
    ) -> Result<mpsc::Receiver<SpeechEvent>> {
        let (tx, rx) = mpsc::channel(32);

        let provider = Self {
            client: self.client.clone(),
            model: self.model.clone(),
        };
        let language = language.to_string();

        tokio::spawn(async move {
            let _ = tx.send(SpeechEvent::SessionStarted).await;
            match provider.transcribe_audio(&audio, &language).await {
                Ok(utterances) => {
                    for utterance in utterances {
                        if tx
                            .send(SpeechEvent::UtteranceFinalized(utterance))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    let _ = tx.send(SpeechEvent::SessionStopped).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(SpeechEvent::Canceled {
                            reason: e.to_string(),
                        })
                        .await;
                }
            }
        });

        Ok(rx)
    }
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_check() {
        let _ = is_api_key_configured();
    }
}
