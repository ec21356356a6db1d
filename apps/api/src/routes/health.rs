use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
///
/// Liveness plus a glance at what the service is serving: the size of the
/// active job corpus and which storage and scoring backends are wired in.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let corpus = state.corpus.snapshot().await;
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "jobs_loaded": corpus.len(),
        "storage": state.store.backend(),
        "scorer": state.scorer.backend(),
    }))
}
