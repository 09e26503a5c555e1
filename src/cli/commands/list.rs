//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::CallPipeline;
use crate::vector_store::VectorStore;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let pipeline = CallPipeline::new(settings)?;
    let store = pipeline.store();

    let transcripts = store.list_transcripts()?;
    if transcripts.is_empty() {
        Output::info("No transcripts stored yet. Use 'samtal transcribe <file>' to add one.");
    } else {
        Output::header(&format!("Stored Transcripts ({})", transcripts.len()));
        println!();
        for (call_id, utterance_count) in &transcripts {
            Output::list_item(&format!("{} ({} utterances)", call_id, utterance_count));
        }
    }

    let calls = store.list_calls().await?;
    if !calls.is_empty() {
        Output::header(&format!("Indexed Calls ({})", calls.len()));
        println!();
        for call in &calls {
            Output::call_info(&call.call_id, call.record_count);
        }

        let total_records: u32 = calls.iter().map(|c| c.record_count).sum();
        println!();
        Output::kv("Total records", &total_records.to_string());
    }

    Ok(())
}
