//! In-process resource API for scenario tests.
//!
//! Binds an axum router to `127.0.0.1:0` and records every request so tests
//! can assert on what the data fixture sent. Create and delete statuses are
//! configurable to drive the fail-fast and cleanup paths.

#![expect(dead_code, reason = "Shared test helper; not every test uses every accessor")]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Id the stub assigns to created posts, mirroring a fake API that ignores input ids
pub const SERVER_ASSIGNED_ID: i64 = 101;

#[derive(Debug)]
struct StubState {
    create_status: StatusCode,
    delete_status: StatusCode,
    created: Mutex<Vec<Value>>,
    deleted: Mutex<Vec<i64>>,
    authorization: Mutex<Vec<Option<String>>>,
}

/// Running stub API server
pub struct StubApi {
    pub base_url: String,
    state: Arc<StubState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StubApi {
    /// Stub that answers creates with `201 Created`
    pub async fn start() -> Self {
        Self::start_with(StatusCode::CREATED, StatusCode::OK).await
    }

    /// Stub that answers creates with `create_status`
    pub async fn with_create_status(create_status: StatusCode) -> Self {
        Self::start_with(create_status, StatusCode::OK).await
    }

    /// Stub that answers deletes with `delete_status`
    pub async fn with_delete_status(delete_status: StatusCode) -> Self {
        Self::start_with(StatusCode::CREATED, delete_status).await
    }

    async fn start_with(create_status: StatusCode, delete_status: StatusCode) -> Self {
        let state = Arc::new(StubState {
            create_status,
            delete_status,
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            authorization: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/posts", post(create_post))
            .route("/posts/:id", delete(delete_post))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub API listener");
        let addr = listener.local_addr().expect("Failed to read stub API address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Stub API server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Bodies received on `POST /posts`
    pub fn created(&self) -> Vec<Value> {
        self.state.created.lock().clone()
    }

    /// Ids received on `DELETE /posts/{id}`
    pub fn deleted(&self) -> Vec<i64> {
        self.state.deleted.lock().clone()
    }

    /// `Authorization` header of each create request
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.state.authorization.lock().clone()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn create_post(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    state.authorization.lock().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    state.created.lock().push(payload.clone());

    if state.create_status != StatusCode::CREATED {
        return (
            state.create_status,
            Json(json!({"error": "stub refused the create"})),
        );
    }

    let mut echoed = payload;
    echoed["id"] = json!(SERVER_ASSIGNED_ID);
    (StatusCode::CREATED, Json(echoed))
}

async fn delete_post(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.deleted.lock().push(id);
    (state.delete_status, Json(json!({})))
}
