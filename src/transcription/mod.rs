//! Transcription module for Samtal.
//!
//! Speech providers deliver utterances incrementally through session
//! events. The [`ConversationTranscriber`] adapter turns that push-based
//! stream into a single blocking call: it accumulates finalized utterances
//! and returns once a terminal event arrives. No callback registration is
//! exposed to callers.

mod models;
mod whisper;

pub use models::{derive_call_id, Transcript};
pub use whisper::{is_api_key_configured, WhisperSpeechProvider};

use crate::audio::PcmAudio;
use crate::error::{Result, SamtalError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Events emitted by a speech provider during a transcription session.
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    /// The provider accepted the session and began recognizing.
    SessionStarted,
    /// One unit of recognized speech was finalized.
    UtteranceFinalized(String),
    /// The session ran to completion.
    SessionStopped,
    /// The provider aborted the session.
    Canceled { reason: String },
}

/// Contract for push-based speech recognition providers.
///
/// A provider consumes PCM audio (mono, 16 kHz, 16-bit) plus a language
/// tag and delivers [`SpeechEvent`]s on the returned channel until a
/// terminal event (`SessionStopped` or `Canceled`).
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn start_session(
        &self,
        audio: PcmAudio,
        language: &str,
    ) -> Result<mpsc::Receiver<SpeechEvent>>;
}

/// Blocking adapter over a push-based speech provider.
pub struct ConversationTranscriber {
    provider: Arc<dyn SpeechProvider>,
    poll_interval: Duration,
    session_deadline: Duration,
}

impl ConversationTranscriber {
    /// Create a transcriber with default wait behavior.
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        Self::with_timing(provider, Duration::from_millis(500), Duration::from_secs(300))
    }

    /// Create a transcriber with custom poll interval and session deadline.
    pub fn with_timing(
        provider: Arc<dyn SpeechProvider>,
        poll_interval: Duration,
        session_deadline: Duration,
    ) -> Self {
        Self {
            provider,
            poll_interval,
            session_deadline,
        }
    }

    /// Transcribe a call recording, blocking until the provider reports a
    /// terminal event.
    ///
    /// Waits with periodic re-checks rather than a tight spin, and gives
    /// up after the session deadline so a hung provider cannot wedge the
    /// caller. A canceled session with at least one finalized utterance is
    /// a partial success; cancellation before any utterance is an error.
    #[instrument(skip(self, audio), fields(duration_secs = audio.duration_seconds()))]
    pub async fn transcribe(&self, audio: PcmAudio, language: &str) -> Result<Transcript> {
        let mut events = self.provider.start_session(audio, language).await?;

        let mut utterances: Vec<String> = Vec::new();
        let deadline = Instant::now() + self.session_deadline;

        loop {
            if Instant::now() >= deadline {
                return Err(SamtalError::Transcription(format!(
                    "no terminal event within {:?}",
                    self.session_deadline
                )));
            }

            let event = match tokio::time::timeout(self.poll_interval, events.recv()).await {
                // Poll tick elapsed without an event; re-check the deadline.
                Err(_) => continue,
                Ok(None) => {
                    return Err(SamtalError::Transcription(
                        "provider closed the session without a terminal event".to_string(),
                    ))
                }
                Ok(Some(event)) => event,
            };

            match event {
                SpeechEvent::SessionStarted => {
                    debug!("Transcription session started");
                }
                SpeechEvent::UtteranceFinalized(text) => {
                    debug!("Finalized utterance ({} chars)", text.len());
                    utterances.push(text);
                }
                SpeechEvent::SessionStopped => {
                    debug!("Session stopped with {} utterances", utterances.len());
                    return Ok(Transcript::new(utterances, language));
                }
                SpeechEvent::Canceled { reason } => {
                    if utterances.is_empty() {
                        return Err(SamtalError::Transcription(format!(
                            "session canceled before any utterance was finalized: {}",
                            reason
                        )));
                    }
                    // Partial transcript is still usable; surface the
                    // cancellation as a warning, not a failure.
                    warn!("Session canceled after {} utterances: {}", utterances.len(), reason);
                    return Ok(Transcript::new(utterances, language));
                }
            }
        }
    }
}
