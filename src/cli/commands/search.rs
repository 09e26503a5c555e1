//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::CallPipeline;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    max_results: usize,
    min_score: f32,
    settings: Settings,
) -> Result<()> {
    let pipeline = CallPipeline::new(settings)?;

    let spinner = Output::spinner("Searching...");
    let results = pipeline.search(query, max_results, min_score).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", results.len()));
                for result in &results {
                    Output::search_result(
                        &result.record.call_id,
                        result.score,
                        &result.record.source_text,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
