//! Nazotte search: estates inside a polygon drawn on the map.
//!
//! The database narrows candidates to the polygon's bounding box; the exact
//! containment test runs here.

use serde::Deserialize;

use super::geometry::{Coordinate, Polygon};
use crate::database::models::Estate;
use crate::errors::{AppError, AppResult};

/// Maximum number of estates returned by one nazotte search.
pub const NAZOTTE_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct NazotteRequest {
    pub coordinates: Option<Vec<Coordinate>>,
}

/// Decode the request body into a usable polygon.
pub fn parse_request(body: &[u8]) -> AppResult<Polygon> {
    let request: NazotteRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("invalid request body: {e}")))?;
    let coordinates = request
        .coordinates
        .ok_or_else(|| AppError::bad_request("coordinates not found"))?;
    if coordinates.is_empty() {
        return Err(AppError::bad_request("coordinates are empty"));
    }
    let count = coordinates.len();
    Polygon::new(coordinates).ok_or_else(|| {
        AppError::bad_request(format!(
            "coordinates do not form a polygon ({count} points given)"
        ))
    })
}

/// Keep candidates strictly inside `polygon`, preserving their order, up to
/// [`NAZOTTE_LIMIT`].
pub fn filter_inside(polygon: &Polygon, candidates: Vec<Estate>) -> Vec<Estate> {
    candidates
        .into_iter()
        .filter(|e| {
            polygon.contains(Coordinate {
                latitude: e.latitude,
                longitude: e.longitude,
            })
        })
        .take(NAZOTTE_LIMIT)
        .collect()
}
