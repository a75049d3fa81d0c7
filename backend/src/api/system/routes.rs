use axum::routing::post;
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn system_router() -> Router<AppState> {
    Router::new().route("/initialize", post(handlers::initialize))
}
