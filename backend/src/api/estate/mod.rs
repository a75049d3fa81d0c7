//! Estate listing API: search, nazotte, detail, document requests, import and
//! chair-based recommendations.

pub mod handlers;
pub mod routes;
