//! Module for core business logic services.
//!
//! These services hold the in-process rules that sit between the HTTP
//! handlers and the SQL layer: search parameter parsing, range bucketing,
//! CSV import preparation and the nazotte polygon filter.

pub mod conditions;
pub mod geometry;
pub mod import;
pub mod nazotte;
pub mod search;
