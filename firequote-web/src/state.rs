//! Shared application state

use sqlx::SqlitePool;

use crate::config::ServerConfig;

/// Shared state for all quote endpoints
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: ServerConfig) -> Self {
        Self { pool, config }
    }
}
