//! Rejects known crawlers before they reach a handler.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use regex::RegexSet;

use crate::errors::{AppError, AppResult};
use crate::AppState;

/// User-Agent patterns answered with 503.
pub const BOT_PATTERNS: [&str; 10] = [
    r"ISUCONbot(-Mobile)?",
    r"ISUCONbot-Image/",
    r"Mediapartners-ISUCON",
    r"ISUCONCoffee",
    r"ISUCONFeedSeeker(Beta)?",
    r"crawler \(https://isucon\.invalid/(support/faq/|help/jp/)",
    r"isubot",
    r"Isupider",
    r"Isupider(-image)?\+",
    r"(?i)(bot|crawler|spider)(?:[-_ ./;@()]|$)",
];

#[derive(Debug, Clone)]
pub struct BotGuard {
    patterns: RegexSet,
}

impl BotGuard {
    pub fn new() -> AppResult<Self> {
        let patterns = RegexSet::new(BOT_PATTERNS)
            .map_err(|e| AppError::Internal(format!("invalid bot pattern: {e}")))?;
        Ok(Self { patterns })
    }

    pub fn is_bot(&self, user_agent: &str) -> bool {
        self.patterns.is_match(user_agent)
    }
}

pub async fn bot_guard_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if state.bot_guard.is_bot(user_agent) {
        tracing::debug!(user_agent, "rejecting bot request");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    next.run(request).await
}
