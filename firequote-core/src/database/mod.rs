//! Database connection and management
//!
//! Connection pooling and schema bootstrap for the quoting store, plus the
//! per-record repositories. Concurrency control is delegated entirely to
//! the engine; this layer issues no transactions or locks of its own.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

pub mod client_repository;
pub mod norm_repository;
pub mod quote_repository;
pub mod template_repository;

pub use client_repository::ClientRepository;
pub use norm_repository::NormRepository;
pub use quote_repository::QuoteRepository;
pub use template_repository::TemplateRepository;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:firequote.db".to_string()),
            max_connections: std::env::var("DATABASE_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            connection_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a pool against the configured database, creating the file on first
/// run, and make sure the schema exists.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connection_timeout)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    info!("database ready at {}", config.database_url);
    Ok(pool)
}

/// In-memory database with the schema applied. A single connection keeps
/// every caller on the same memory store.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Idempotent schema bootstrap. Versioned migrations are out of scope for
/// this tool; every statement is `IF NOT EXISTS`.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    const STATEMENTS: [&str; 5] = [
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT '',
            full_name TEXT NOT NULL,
            position TEXT NOT NULL DEFAULT '',
            company TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS norms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            services TEXT NOT NULL DEFAULT '[]',
            default_selected INTEGER NOT NULL DEFAULT 0
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS template_docs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            services_tag TEXT NOT NULL DEFAULT '',
            formats_tag TEXT NOT NULL DEFAULT ''
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS quotes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL REFERENCES clients(id),
            project_name TEXT NOT NULL,
            is_detection INTEGER NOT NULL DEFAULT 0,
            is_protection INTEGER NOT NULL DEFAULT 0,
            is_human_safety INTEGER NOT NULL DEFAULT 0,
            deliver_autocad INTEGER NOT NULL DEFAULT 0,
            deliver_revit INTEGER NOT NULL DEFAULT 0,
            building_type TEXT NOT NULL DEFAULT '',
            area_sqm TEXT,
            manual_requirements TEXT NOT NULL DEFAULT '',
            manual_items_sh TEXT NOT NULL DEFAULT '',
            manual_items_detection TEXT NOT NULL DEFAULT '',
            manual_items_protection TEXT NOT NULL DEFAULT '',
            payment_advance INTEGER NOT NULL DEFAULT 40,
            payment_first_version INTEGER NOT NULL DEFAULT 40,
            payment_final INTEGER NOT NULL DEFAULT 20,
            delivery_time_value INTEGER NOT NULL DEFAULT 0,
            delivery_time_unit TEXT NOT NULL DEFAULT 'days',
            value_protection TEXT NOT NULL DEFAULT '0',
            value_detection TEXT NOT NULL DEFAULT '0',
            value_human_safety TEXT NOT NULL DEFAULT '0',
            total_value TEXT NOT NULL DEFAULT '0',
            generated_doc TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS quote_norms (
            quote_id INTEGER NOT NULL REFERENCES quotes(id) ON DELETE CASCADE,
            norm_id INTEGER NOT NULL REFERENCES norms(id) ON DELETE CASCADE,
            PRIMARY KEY (quote_id, norm_id)
        )
        "#,
    ];

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
