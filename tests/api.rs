use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use rustydigest::api::create_router;
use rustydigest::processing::{DigestService, SummarizerSettings};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn post_summarize(app: axum::Router, payload: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/summarize")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("router response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&body).expect("json body"))
}

#[tokio::test]
async fn summarize_returns_report_for_readable_documents() {
    let app = create_router(Arc::new(DigestService::new(SummarizerSettings::default())));
    let (status, json) = post_summarize(
        app,
        json!({
            "documents": [{
                "filename": "notes.txt",
                "raw_text": "Solar farms expanded quickly. Storage followed close behind."
            }],
            "task_type": "article"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["approach"], "extractive_summarization");
    assert_eq!(json["task_type"], "article");
    assert_eq!(json["file_info"][0]["extension"], ".txt");
    assert!(
        json["processed_content"]
            .as_str()
            .unwrap()
            .contains("Solar farms expanded quickly.")
    );
}

#[tokio::test]
async fn unreadable_batches_report_failure_with_ok_status() {
    let service = Arc::new(DigestService::new(SummarizerSettings::default()));
    let app = create_router(service.clone());
    let (status, json) = post_summarize(
        app,
        json!({ "documents": [{ "filename": "blank.txt", "raw_text": "   " }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "success": false, "error": "No readable content found" }));
    assert_eq!(service.metrics().snapshot().summaries_failed, 1);
}
