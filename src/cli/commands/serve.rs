//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for transcription, vectorization, and semantic
//! search over indexed calls.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{CallPipeline, EmbeddingMode};
use crate::text::normalize;
use crate::vector_store::VectorStore;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    pipeline: CallPipeline,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let pipeline = CallPipeline::new(settings)?;

    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Samtal API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcribe", "POST /transcribe");
    Output::kv("Vectorize", "GET  /vectorize?text=...");
    Output::kv("Vector Search", "POST /vector-search");
    Output::kv("Search", "POST /search");
    Output::kv("List Calls", "GET  /calls");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/transcribe", post(transcribe))
        .route("/vectorize", get(vectorize))
        .route("/vector-search", post(vector_search))
        .route("/search", post(search))
        .route("/calls", get(list_calls))
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TranscribeQuery {
    /// Embed the transcript after transcription.
    #[serde(default)]
    embed: bool,
}

#[derive(Serialize)]
struct TranscribeResponse {
    call_id: String,
    utterances: Vec<String>,
    records_indexed: usize,
}

#[derive(Deserialize)]
struct VectorizeQuery {
    text: String,
}

#[derive(Deserialize)]
struct VectorSearchRequest {
    vector: Vec<f32>,
    #[serde(default)]
    max_results: usize,
    #[serde(default = "default_min_score")]
    minimum_similarity_score: f32,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    max_results: usize,
    #[serde(default = "default_min_score")]
    minimum_similarity_score: f32,
}

fn default_min_score() -> f32 {
    0.8
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResultInfo>,
}

#[derive(Serialize)]
struct SearchResultInfo {
    id: String,
    call_id: String,
    source_text: String,
    score: f32,
}

#[derive(Serialize)]
struct CallListResponse {
    calls: Vec<CallInfo>,
    total: usize,
}

#[derive(Serialize)]
struct CallInfo {
    call_id: String,
    record_count: u32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn internal_error(e: impl std::fmt::Display) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranscribeQuery>,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    let transcript = match state.pipeline.transcribe_call(&body).await {
        Ok(t) => t,
        Err(e) => return internal_error(e),
    };

    let records_indexed = if query.embed {
        match state
            .pipeline
            .embed_call(&transcript, EmbeddingMode::PerUtterance)
            .await
        {
            Ok(count) => count,
            Err(e) => return internal_error(e),
        }
    } else {
        0
    };

    Json(TranscribeResponse {
        call_id: transcript.id,
        utterances: transcript.utterances,
        records_indexed,
    })
    .into_response()
}

/// Normalize and embed a piece of text, returning the raw vector.
async fn vectorize(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VectorizeQuery>,
) -> impl IntoResponse {
    let normalized = normalize(&query.text);
    if normalized.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "text must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    match state.pipeline.embedder().embed(&normalized).await {
        Ok(vector) => Json(vector).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Search with a caller-supplied query vector.
async fn vector_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VectorSearchRequest>,
) -> impl IntoResponse {
    let store = state.pipeline.store() as Arc<dyn VectorStore>;
    match store
        .search(&req.vector, req.max_results, req.minimum_similarity_score)
        .await
    {
        Ok(results) => Json(to_search_response(results)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Search with query text, embedding it server-side.
async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    match state
        .pipeline
        .search(&req.query, req.max_results, req.minimum_similarity_score)
        .await
    {
        Ok(results) => Json(to_search_response(results)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn list_calls(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.pipeline.store() as Arc<dyn VectorStore>;
    match store.list_calls().await {
        Ok(calls) => Json(CallListResponse {
            total: calls.len(),
            calls: calls
                .into_iter()
                .map(|c| CallInfo {
                    call_id: c.call_id,
                    record_count: c.record_count,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

fn to_search_response(results: Vec<crate::vector_store::SearchResult>) -> SearchResponse {
    SearchResponse {
        results: results
            .into_iter()
            .map(|r| SearchResultInfo {
                id: r.record.id,
                call_id: r.record.call_id,
                source_text: r.record.source_text,
                score: r.score,
            })
            .collect(),
    }
}
