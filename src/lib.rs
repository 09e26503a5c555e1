//! Samtal - Call-Transcript Analytics
//!
//! A local-first CLI tool for turning recorded customer-service calls into
//! transcripts, analyses, and a semantically searchable vector index.
//!
//! The name "Samtal" comes from the Scandinavian word for "conversation."
//!
//! # Overview
//!
//! Samtal allows you to:
//! - Transcribe WAV recordings of customer-service calls
//! - Run compliance checks, summaries, sentiment/opinion mining, and
//!   entity extraction over a transcript
//! - Embed transcript content and persist it in a vector store
//! - Search stored calls by semantic similarity
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `audio` - WAV decoding for uploaded call recordings
//! - `transcription` - Speech-to-text transcription behind a blocking adapter
//! - `analysis` - Memoized per-transcript analyses (compliance, summaries, sentiment, entities)
//! - `text` - Utterance normalization
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `search` - Query embedding and similarity retrieval
//! - `pipeline` - End-to-end coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use samtal::config::Settings;
//! use samtal::pipeline::CallPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = CallPipeline::new(settings)?;
//!
//!     let audio = std::fs::read("call.wav")?;
//!     let transcript = pipeline.transcribe_call(&audio).await?;
//!     println!("Transcribed {} utterances", transcript.utterances.len());
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod search;
pub mod text;
pub mod transcription;
pub mod vector_store;

pub use error::{Result, SamtalError};
