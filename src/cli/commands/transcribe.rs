//! Transcribe command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{CallPipeline, EmbeddingMode};
use crate::transcription;
use anyhow::Result;

/// Run the transcribe command.
pub async fn run_transcribe(
    file: &str,
    embed: bool,
    whole_call: bool,
    settings: Settings,
) -> Result<()> {
    if !transcription::is_api_key_configured() {
        Output::error("OPENAI_API_KEY is not set.");
        anyhow::bail!("Missing API key");
    }

    let wav_bytes = std::fs::read(file)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {}", file, e))?;

    let pipeline = CallPipeline::new(settings)?;

    let spinner = Output::spinner("Transcribing call...");
    let result = pipeline.transcribe_call(&wav_bytes).await;
    spinner.finish_and_clear();

    let transcript = match result {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("Transcription failed: {}", e));
            return Err(e.into());
        }
    };

    Output::success(&format!(
        "Transcribed call {} ({} utterances)",
        transcript.id,
        transcript.utterances.len()
    ));
    for utterance in &transcript.utterances {
        Output::list_item(utterance);
    }

    if embed {
        let mode = if whole_call {
            EmbeddingMode::WholeCall
        } else {
            EmbeddingMode::PerUtterance
        };
        let spinner = Output::spinner("Embedding transcript...");
        let count = pipeline.embed_call(&transcript, mode).await?;
        spinner.finish_and_clear();
        Output::success(&format!("Indexed {} embedding records", count));
    } else {
        Output::info(&format!(
            "Run 'samtal embed {}' to index this call for search.",
            transcript.id
        ));
    }

    Ok(())
}
