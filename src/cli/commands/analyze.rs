//! Analyze command implementation.

use crate::analysis::{AnalysisKind, AnalysisParams, AnalysisResult, ComplianceFlags};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SamtalError;
use crate::pipeline::CallPipeline;
use anyhow::Result;

/// Run the analyze command.
pub async fn run_analyze(
    call_id: &str,
    kind: &str,
    recording_notice: bool,
    topic_relevance: bool,
    settings: Settings,
) -> Result<()> {
    let kind: AnalysisKind = kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let params = match kind {
        AnalysisKind::Compliance => AnalysisParams::Compliance(ComplianceFlags {
            requires_recording_notice: recording_notice,
            requires_topic_relevance: topic_relevance,
        }),
        _ => {
            if recording_notice || topic_relevance {
                Output::warning("Compliance flags are ignored for non-compliance analyses.");
            }
            AnalysisParams::None
        }
    };

    let pipeline = CallPipeline::new(settings)?;

    let transcript = pipeline
        .get_transcript(call_id)?
        .ok_or_else(|| anyhow::anyhow!("No stored transcript for call {}", call_id))?;

    let spinner = Output::spinner(&format!("Running {} analysis...", kind));
    let result = pipeline.analyze_call(&transcript, kind, params).await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => print_result(&result)?,
        // Provider-scoped failures are reported but do not abort; the
        // transcript and any cached analyses stay usable.
        Err(SamtalError::AnalysisProvider { code, message }) => {
            Output::warning(&format!("Analysis failed ({}): {}", code, message));
        }
        Err(e) => {
            Output::error(&format!("Analysis failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

fn print_result(result: &AnalysisResult) -> Result<()> {
    match result {
        AnalysisResult::Compliance(text) | AnalysisResult::QuerySummary(text) => {
            println!("{}", text);
        }
        AnalysisResult::ExtractiveSummary(summary) | AnalysisResult::AbstractiveSummary(summary) => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        AnalysisResult::SentimentAndOpinions(sentiment) => {
            println!("{}", serde_json::to_string_pretty(sentiment)?);
        }
        AnalysisResult::Entities(entities) => {
            println!("{}", serde_json::to_string_pretty(entities)?);
        }
    }
    Ok(())
}
