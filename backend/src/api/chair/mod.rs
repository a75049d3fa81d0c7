//! Chair listing API: search, detail, purchase and bulk import.

pub mod handlers;
pub mod routes;
