//! Defines the HTTP routes for estate listings.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn estate_router() -> Router<AppState> {
    Router::new()
        .route("/api/estate", post(handlers::import_estates))
        .route("/api/estate/low_priced", get(handlers::low_priced_estates))
        .route("/api/estate/search", get(handlers::search_estates))
        .route("/api/estate/search/condition", get(handlers::estate_search_condition))
        .route("/api/estate/nazotte", post(handlers::nazotte_search))
        .route("/api/estate/req_doc/{id}", post(handlers::request_document))
        .route("/api/estate/{id}", get(handlers::get_estate))
        .route("/api/recommended_estate/{id}", get(handlers::recommended_estates))
}
