mod models;

pub use models::*;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub type DbPool = SqlitePool;

/// Names of the tables the service cannot run without.
pub const REQUIRED_TABLES: [&str; 5] = [
    "users",
    "planets",
    "people",
    "favorite_planets",
    "favorite_people",
];

/// Execute a SQL migration file, properly handling comments.
///
/// Comment lines are dropped before splitting on `;` so a semicolon inside a
/// comment never ends a statement.
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    let cleaned: String = sql
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    for statement in cleaned.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open the pool described by `config` and bring the schema up to date.
pub async fn init(config: &DatabaseConfig) -> Result<DbPool> {
    let in_memory = is_in_memory(&config.url);

    let mut options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid database URL: {}", config.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if in_memory {
        info!("Initializing in-memory database");
        // Every connection to :memory: is a separate database, so keep exactly one alive.
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        let path = options.get_filename().to_path_buf();
        if let Some(parent) = path.parent() {
            crate::utils::ensure_dir(parent)?;
        }
        info!("Initializing database at {}", path.display());

        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to {}", config.url))?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub(crate) async fn index_exists(pool: &SqlitePool, index: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='index' AND name = ?")
            .bind(index)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: Initial schema
    let mut missing_tables = false;
    for table in REQUIRED_TABLES {
        if !table_exists(pool, table).await? {
            missing_tables = true;
            break;
        }
    }
    if missing_tables {
        execute_sql(pool, include_str!("../../migrations/001_initial.sql"))
            .await
            .context("Migration 001 failed")?;
    }

    // Migration 002: Unique (user, item) pairs on both favorite tables
    let has_planet_index = index_exists(pool, FAVORITE_PLANETS_UNIQUE_INDEX).await?;
    let has_people_index = index_exists(pool, FAVORITE_PEOPLE_UNIQUE_INDEX).await?;
    if !has_planet_index || !has_people_index {
        execute_sql(pool, include_str!("../../migrations/002_favorite_uniqueness.sql"))
            .await
            .context("Migration 002 failed")?;
    }

    info!("Migrations completed");
    Ok(())
}
