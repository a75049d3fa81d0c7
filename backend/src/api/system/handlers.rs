//! `/initialize`: rebuild the schema and reload seed data.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppResult;
use crate::AppState;

pub async fn initialize(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let started = Instant::now();
    let files = state.db.initialize(state.data_dir.clone()).await?;
    info!(
        seed_files = files,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "initialize finished"
    );
    Ok(Json(json!({ "language": "rust" })))
}
