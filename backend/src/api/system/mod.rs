//! Maintenance endpoints.

pub mod handlers;
pub mod routes;
