//! Handler functions for the estate API.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::Multipart;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use crate::api::{read_upload, require_email};
use crate::database::models::{Estate, EstateList, EstateSearchResult};
use crate::database::queries;
use crate::errors::{AppError, AppResult};
use crate::services::conditions::EstateSearchCondition;
use crate::services::{import, nazotte, search};
use crate::AppState;

pub async fn low_priced_estates(State(state): State<AppState>) -> AppResult<Json<EstateList>> {
    let estates = state.db.run(|conn| queries::low_priced_estates(conn)).await?;
    Ok(Json(EstateList { estates }))
}

pub async fn search_estates(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<EstateSearchResult>> {
    let (filter, page) = search::parse_estate_search(&params)?;
    let (count, estates) = state
        .db
        .run(move |conn| queries::search_estates(conn, &filter, page))
        .await?;
    Ok(Json(EstateSearchResult { count, estates }))
}

pub async fn estate_search_condition(
    State(state): State<AppState>,
) -> Json<EstateSearchCondition> {
    Json(state.conditions.estate.clone())
}

/// Estates strictly inside the drawn polygon. `count` is the number returned,
/// not the number of matches.
pub async fn nazotte_search(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<EstateSearchResult>> {
    let polygon = nazotte::parse_request(&body)?;
    let bbox = polygon.bounding_box();
    let candidates = state
        .db
        .run(move |conn| queries::estates_in_bounding_box(conn, &bbox))
        .await?;
    let candidate_count = candidates.len();
    let estates = nazotte::filter_inside(&polygon, candidates);
    debug!(
        polygon = %polygon.to_wkt(),
        candidates = candidate_count,
        matched = estates.len(),
        "nazotte search"
    );
    Ok(Json(EstateSearchResult {
        count: estates.len() as i64,
        estates,
    }))
}

pub async fn get_estate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Estate>> {
    let id = search::parse_id(&id)?;
    let estate = state
        .db
        .run(move |conn| queries::find_estate(conn, id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("estate {id}")))?;
    Ok(Json(estate))
}

pub async fn import_estates(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<StatusCode> {
    let data = read_upload(multipart, "estates").await?;
    let rows = import::prepare_estates(&state.conditions, &data)?;
    let inserted = state
        .db
        .run(move |conn| queries::insert_estates(conn, &rows))
        .await?;
    info!(inserted, "imported estates");
    Ok(StatusCode::CREATED)
}

pub async fn request_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<StatusCode> {
    let email = require_email(&body)?;
    let id = search::parse_id(&id)?;
    state
        .db
        .run(move |conn| queries::find_estate(conn, id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("estate {id}")))?;
    info!(estate_id = id, email = %email, "document requested");
    Ok(StatusCode::OK)
}

/// Estates whose door the chair fits through, using its two smallest sides.
pub async fn recommended_estates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<EstateList>> {
    let id = search::parse_id(&id)?;
    let estates = state
        .db
        .run(move |conn| {
            let chair = queries::find_chair(conn, id)?
                .ok_or_else(|| AppError::not_found(format!("chair {id}")))?;
            let [short, long, _] = chair.sorted_dimensions();
            queries::estates_fitting(conn, short, long)
        })
        .await?;
    Ok(Json(EstateList { estates }))
}
