//! Handler functions for the chair API.
//!
//! Handlers parse the request, hand SQL work to `database::queries` through
//! [`crate::Database::run`] and shape the JSON response.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::Multipart;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::api::{read_upload, require_email};
use crate::database::models::{Chair, ChairList, ChairSearchResult};
use crate::database::queries;
use crate::errors::{AppError, AppResult};
use crate::services::conditions::ChairSearchCondition;
use crate::services::{import, search};
use crate::AppState;

pub async fn low_priced_chairs(State(state): State<AppState>) -> AppResult<Json<ChairList>> {
    let chairs = state.db.run(|conn| queries::low_priced_chairs(conn)).await?;
    Ok(Json(ChairList { chairs }))
}

pub async fn search_chairs(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ChairSearchResult>> {
    let (filter, page) = search::parse_chair_search(&params)?;
    let (count, chairs) = state
        .db
        .run(move |conn| queries::search_chairs(conn, &filter, page))
        .await?;
    Ok(Json(ChairSearchResult { count, chairs }))
}

pub async fn chair_search_condition(State(state): State<AppState>) -> Json<ChairSearchCondition> {
    Json(state.conditions.chair.clone())
}

/// Sold-out chairs are reported as missing.
pub async fn get_chair(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Chair>> {
    let id = search::parse_id(&id)?;
    let chair = state
        .db
        .run(move |conn| queries::find_chair(conn, id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("chair {id}")))?;
    if chair.stock <= 0 {
        return Err(AppError::not_found(format!("chair {id} is sold out")));
    }
    Ok(Json(chair))
}

pub async fn import_chairs(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<StatusCode> {
    let data = read_upload(multipart, "chairs").await?;
    let rows = import::prepare_chairs(&state.conditions, &data)?;
    let inserted = state
        .db
        .run(move |conn| queries::insert_chairs(conn, &rows))
        .await?;
    info!(inserted, "imported chairs");
    Ok(StatusCode::CREATED)
}

pub async fn buy_chair(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<StatusCode> {
    let email = require_email(&body)?;
    let id = search::parse_id(&id)?;
    let bought = state.db.run(move |conn| queries::buy_chair(conn, id)).await?;
    if !bought {
        return Err(AppError::not_found(format!("chair {id} is not available")));
    }
    info!(chair_id = id, email = %email, "chair purchased");
    Ok(StatusCode::OK)
}
