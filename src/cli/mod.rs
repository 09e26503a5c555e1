//! CLI module for Samtal.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Samtal - Call Transcript Analytics
///
/// Transcribes recorded customer calls, runs transcript analyses, and
/// builds a searchable vector index over the results. The name "Samtal"
/// comes from the Scandinavian word for "conversation."
#[derive(Parser, Debug)]
#[command(name = "samtal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a recorded call from a WAV file
    Transcribe {
        /// Path to a 16 kHz mono 16-bit PCM WAV file
        file: String,

        /// Also embed the transcript into the vector index
        #[arg(short, long)]
        embed: bool,

        /// Embed the whole call as one record instead of per utterance
        #[arg(long)]
        whole_call: bool,
    },

    /// Run an analysis over a stored transcript
    Analyze {
        /// Call ID of a previously transcribed call
        call_id: String,

        /// Analysis kind (compliance, extractive-summary, abstractive-summary,
        /// query-summary, sentiment, entities)
        kind: String,

        /// For compliance: ask whether the caller knew the call was recorded
        #[arg(long)]
        recording_notice: bool,

        /// For compliance: ask whether the call stayed on topic
        #[arg(long)]
        topic_relevance: bool,
    },

    /// Embed a stored transcript into the vector index
    Embed {
        /// Call ID of a previously transcribed call
        call_id: String,

        /// Embed the whole call as one record instead of per utterance
        #[arg(long)]
        whole_call: bool,
    },

    /// Search indexed calls for similar transcript segments
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (0 for unlimited)
        #[arg(short, long, default_value = "0")]
        max_results: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short = 's', long, default_value = "0.8")]
        min_score: f32,
    },

    /// List stored transcripts and indexed calls
    List,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
