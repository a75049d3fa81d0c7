//! General-purpose middleware for the API.
//!
//! Applied to the whole router: the bot guard short-circuits crawler traffic
//! with 503, and request tracing wraps every request in a span carrying its
//! request id.

pub mod bot_guard;
pub mod request_tracing;

pub use bot_guard::{bot_guard_middleware, BotGuard};
pub use request_tracing::request_tracing_middleware;
