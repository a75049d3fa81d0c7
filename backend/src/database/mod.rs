//! Module for database connection setup and common utilities.
//!
//! The backend talks to a single SQLite connection. Handlers never touch the
//! connection directly: they hand a closure to [`Database::run`], which executes
//! it on the blocking thread pool while holding the connection lock.

pub mod models;
pub mod queries;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::AppResult;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        apply_pragmas(&conn)?;
        if !schema_present(&conn)? {
            info!(path = %path.display(), "creating schema");
            conn.execute_batch(SCHEMA_SQL)?;
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute `f` against the connection on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await?
    }

    /// Drop and recreate every table, then execute the seed files found in
    /// `data_dir` in lexical order.
    pub async fn initialize(&self, data_dir: Option<PathBuf>) -> AppResult<usize> {
        self.run(move |conn| {
            reset_schema(conn)?;
            match data_dir {
                Some(dir) => load_seed_files(conn, &dir),
                None => Ok(0),
            }
        })
        .await
    }
}

fn apply_pragmas(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA temp_store=MEMORY; PRAGMA foreign_keys=OFF;",
    )?;
    Ok(())
}

fn schema_present(conn: &Connection) -> AppResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('chair', 'estate', 'chair_features', 'estate_features')",
        [],
        |row| row.get(0),
    )?;
    Ok(count == 4)
}

pub(crate) fn reset_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Run every `*.sql` file in `dir`, sorted by file name. Returns the number
/// of files executed.
pub(crate) fn load_seed_files(conn: &mut Connection, dir: &Path) -> AppResult<usize> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();

    let tx = conn.transaction()?;
    for file in &files {
        debug!(file = %file.display(), "executing seed file");
        let sql = fs::read_to_string(file)?;
        tx.execute_batch(&sql)?;
    }
    tx.commit()?;
    Ok(files.len())
}
