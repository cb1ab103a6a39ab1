//! HTTP surface for Rusty Digest.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /summarize` – Combine already-extracted documents and return a budgeted extractive
//!   summary. Both successful and `{success: false}` results are returned with status 200; only
//!   malformed request bodies are rejected.
//! - `GET /metrics` – Observe summarization counters and fallback usage.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.

use crate::metrics::MetricsSnapshot;
use crate::processing::{Document, DocumentInfo, SummarizationApi, SummaryRequest, SummaryResult};
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummarizationApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// One extracted document in a `POST /summarize` body.
#[derive(Deserialize)]
struct DocumentPayload {
    /// Source file name; the header written above the document's text.
    filename: String,
    /// Optional extension override (derived from `filename` when absent).
    #[serde(default)]
    extension: Option<String>,
    /// Optional size in bytes (defaults to the text length).
    #[serde(default)]
    size: Option<u64>,
    /// Extracted plain text.
    raw_text: String,
}

impl From<DocumentPayload> for Document {
    fn from(payload: DocumentPayload) -> Self {
        let size = payload.size.unwrap_or(payload.raw_text.len() as u64);
        let mut info = DocumentInfo::from_filename(payload.filename, size);
        if let Some(extension) = payload.extension.filter(|ext| !ext.trim().is_empty()) {
            info.extension = extension.to_lowercase();
        }
        Document {
            info,
            raw_text: payload.raw_text,
        }
    }
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    documents: Vec<DocumentPayload>,
    #[serde(default)]
    task: String,
    #[serde(default)]
    task_type: String,
    #[serde(default)]
    query: Option<String>,
}

/// Summarize a batch of documents.
async fn summarize<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Json<SummaryResult>
where
    S: SummarizationApi,
{
    let SummarizeRequest {
        documents,
        task,
        task_type,
        query,
    } = request;
    let document_count = documents.len();
    let result = service
        .summarize(SummaryRequest {
            documents: documents.into_iter().map(Document::from).collect(),
            task,
            task_type,
            query,
        })
        .await;
    tracing::info!(
        documents = document_count,
        success = result.is_success(),
        "Summarize request completed"
    );
    Json(result)
}

/// Return the current summarization counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: SummarizationApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Summarize extracted documents into a budgeted extract. A non-blank query (or task) focuses selection on it; otherwise sentences are ranked without a query. Response is { \"success\": true, \"processed_content\": string, ... } or { \"success\": false, \"error\": string }.",
                request_example: Some(json!({
                    "documents": [
                        { "filename": "report.txt", "raw_text": "Document contents" }
                    ],
                    "task": "Create slides about solar adoption",
                    "task_type": "presentation",
                    "query": "solar adoption"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return summarization counters, including how often each fallback tier ran.",
                request_example: None,
            },
        ],
    })
}
