//! JSON HTTP server.
//!
//! Carries the same messages as the stdio channel, plus the two host actions
//! that can be invoked without a view.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/messages` | Any protocol request; `200` with the response or `204` |
//! | `POST` | `/actions/delete-chunk` | `{ version, chunkIndex }` |
//! | `POST` | `/actions/update-chunk` | `{ version, chunkIndex, chunk }` |
//!
//! Like the message channel, nothing is reported as an error: a request that
//! cannot be served answers `204 No Content` and the reason goes to the log.
//! All origins, methods, and headers are permitted so a webview can call it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::{SemanticChunk, VersionId};
use crate::protocol::{Request, Response, SyncService};

/// Body of `POST /actions/delete-chunk`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteChunkAction {
    pub version: VersionId,
    pub chunk_index: usize,
}

/// Body of `POST /actions/update-chunk`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChunkAction {
    pub version: VersionId,
    pub chunk_index: usize,
    pub chunk: SemanticChunk,
}

/// Build the router around a shared [`SyncService`].
pub fn router(service: Arc<SyncService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/messages", post(handle_message))
        .route("/actions/delete-chunk", post(handle_delete_action))
        .route("/actions/update-chunk", post(handle_update_action))
        .layer(cors)
        .with_state(service)
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(config: &Config, service: Arc<SyncService>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("HTTP server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn reply(response: Option<Response>) -> HttpResponse {
    match response {
        Some(r) => (StatusCode::OK, Json(r)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_message(
    State(service): State<Arc<SyncService>>,
    Json(request): Json<Request>,
) -> HttpResponse {
    reply(service.handle(request).await)
}

async fn handle_delete_action(
    State(service): State<Arc<SyncService>>,
    Json(action): Json<DeleteChunkAction>,
) -> HttpResponse {
    reply(service.delete_chunk(&action.version, action.chunk_index).await)
}

async fn handle_update_action(
    State(service): State<Arc<SyncService>>,
    Json(action): Json<UpdateChunkAction>,
) -> HttpResponse {
    reply(
        service
            .update_chunk(&action.version, action.chunk_index, action.chunk)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const DOC: &str = "metadata:\n  generated_at: x\n  chunk_count: 2\n  version: v1\nchunks:\n  - title: A\n    description: a\n    tags: []\n    generated_timestamp: t1\n  - title: B\n    description: b\n    tags: []\n    generated_timestamp: t2\n";

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw("v1", DOC);
        router(Arc::new(SyncService::new(store)))
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Option<Value>) {
        let req = HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).unwrap())
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let req = HttpRequest::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_message_round_trip() {
        let (status, body) = post_json(app(), "/messages", json!({"command": "getVersions"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap(), json!({"command": "versions", "data": ["v1"]}));
    }

    #[tokio::test]
    async fn test_unserved_message_is_no_content() {
        let (status, body) = post_json(
            app(),
            "/messages",
            json!({"command": "getReasoning", "version": "nope"}),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_delete_action() {
        let (status, body) = post_json(
            app(),
            "/actions/delete-chunk",
            json!({"version": "v1", "chunkIndex": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["command"], "refreshChunks");
        assert_eq!(body["chunks"].as_array().unwrap().len(), 1);
        assert_eq!(body["chunks"][0]["title"], "B");
    }

    #[tokio::test]
    async fn test_update_action_out_of_range() {
        let (status, _) = post_json(
            app(),
            "/actions/update-chunk",
            json!({
                "version": "v1",
                "chunkIndex": 9,
                "chunk": {
                    "title": "Z",
                    "description": "z",
                    "tags": [],
                    "generated_timestamp": "t9",
                    "approved": true
                }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
