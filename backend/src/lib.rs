//! Chair and estate listing backend.
//!
//! Library half of the `isuumo` binary: application state, the HTTP router
//! and everything behind it. `main.rs` only handles configuration, logging and
//! the listener.

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;

use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

pub use api::build_router;
pub use config::AppConfig;
pub use database::Database;
pub use errors::{AppError, AppResult};

use middleware::BotGuard;
use services::conditions::SearchConditions;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub conditions: Arc<SearchConditions>,
    pub bot_guard: Arc<BotGuard>,
    /// Seed directory for `/initialize`.
    pub data_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let db = Database::open(&config.database.path)?;
        let conditions = SearchConditions::load(config.fixtures.dir.as_deref())?;
        Self::with_parts(db, conditions, config)
    }

    /// Build state around an already opened database.
    pub fn with_parts(
        db: Database,
        conditions: SearchConditions,
        config: &AppConfig,
    ) -> AppResult<Self> {
        Ok(Self {
            db,
            conditions: Arc::new(conditions),
            bot_guard: Arc::new(BotGuard::new()?),
            data_dir: config.database.data_dir.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        })
    }
}
