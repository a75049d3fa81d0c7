//! Defines the HTTP routes for chair listings.
//!
//! Static segments (`low_priced`, `search`) take priority over `{id}`.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn chair_router() -> Router<AppState> {
    Router::new()
        .route("/api/chair", post(handlers::import_chairs))
        .route("/api/chair/low_priced", get(handlers::low_priced_chairs))
        .route("/api/chair/search", get(handlers::search_chairs))
        .route("/api/chair/search/condition", get(handlers::chair_search_condition))
        .route("/api/chair/buy/{id}", post(handlers::buy_chair))
        .route("/api/chair/{id}", get(handlers::get_chair))
}
