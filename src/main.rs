//! Samtal CLI entry point.

use anyhow::Result;
use clap::Parser;
use samtal::cli::{commands, Cli, Commands};
use samtal::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("samtal={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Transcribe {
            file,
            embed,
            whole_call,
        } => {
            commands::run_transcribe(file, *embed, *whole_call, settings).await?;
        }

        Commands::Analyze {
            call_id,
            kind,
            recording_notice,
            topic_relevance,
        } => {
            commands::run_analyze(call_id, kind, *recording_notice, *topic_relevance, settings)
                .await?;
        }

        Commands::Embed { call_id, whole_call } => {
            commands::run_embed(call_id, *whole_call, settings).await?;
        }

        Commands::Search {
            query,
            max_results,
            min_score,
        } => {
            commands::run_search(query, *max_results, *min_score, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
