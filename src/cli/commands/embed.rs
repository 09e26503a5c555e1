//! Embed command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{CallPipeline, EmbeddingMode};
use anyhow::Result;

/// Run the embed command.
pub async fn run_embed(call_id: &str, whole_call: bool, settings: Settings) -> Result<()> {
    let pipeline = CallPipeline::new(settings)?;

    let transcript = pipeline
        .get_transcript(call_id)?
        .ok_or_else(|| anyhow::anyhow!("No stored transcript for call {}", call_id))?;

    let mode = if whole_call {
        EmbeddingMode::WholeCall
    } else {
        EmbeddingMode::PerUtterance
    };

    let spinner = Output::spinner("Embedding transcript...");
    let count = pipeline.embed_call(&transcript, mode).await;
    spinner.finish_and_clear();

    match count {
        Ok(count) => {
            Output::success(&format!("Indexed {} embedding records for {}", count, call_id));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Embedding failed: {}", e));
            Err(e.into())
        }
    }
}
