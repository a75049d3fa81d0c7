//! Central module for organizing the application's HTTP endpoints.
//!
//! Each listing domain (chairs, estates) owns its handlers and routes;
//! `system` holds the maintenance endpoint. [`build_router`] assembles them
//! and applies the shared middleware.

pub mod chair;
pub mod estate;
pub mod system;

use axum::extract::multipart::Multipart;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::middleware::{bot_guard_middleware, request_tracing_middleware};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    Router::new()
        .merge(system::routes::system_router())
        .merge(chair::routes::chair_router())
        .merge(estate::routes::estate_router())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(from_fn_with_state(state.clone(), bot_guard_middleware))
        .layer(from_fn_with_state(state.clone(), request_tracing_middleware))
        .with_state(state)
}

/// Read the whole multipart file field called `name`.
pub(crate) async fn read_upload(mut multipart: Multipart, name: &str) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some(name) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("failed to read '{name}': {e}")))?;
            return Ok(data.to_vec());
        }
    }
    Err(AppError::bad_request(format!("form file '{name}' not found")))
}

#[derive(Debug, Deserialize)]
struct ContactRequest {
    email: Option<Value>,
}

/// Extract the mandatory `email` from a JSON request body. Any value other
/// than `null` or `false` is accepted.
pub(crate) fn require_email(body: &[u8]) -> AppResult<String> {
    let request: ContactRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("invalid request body: {e}")))?;
    match request.email {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {
            Err(AppError::bad_request("email not found in request body"))
        }
        Some(Value::String(email)) => Ok(email),
        Some(other) => Ok(other.to_string()),
    }
}
