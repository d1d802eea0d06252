//! Persistence Layer
//!
//! SQLite storage for computed trading scores, metric snapshots and the
//! screener's securities, price bars and metrics. Async access via sqlx.
//!
//! # Database Schema
//!
//! ## trading_score
//! - symbol: unique key, one row per security
//! - technical / fundamental / news_sentiment / social_sentiment / analyst scores
//! - composite_score
//! - scored_at: Timestamp
//!
//! ## fundamental_percentage
//! - symbol: unique key
//! - valuation / growth / profitability / balance_sheet / earnings_quality (0-100)
//! - updated_at: Timestamp
//!
//! ## metric_snapshots
//! - symbol: unique key
//! - payload: JSON-encoded snapshot
//!
//! ## securities, price_bars_{daily,weekly,monthly}, security_metrics
//! - Screener universe, bars per window and named metric values

pub mod models;
pub mod screener_store;
pub mod snapshot_store;
pub mod trading_score_repository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::domain::errors::{ScoringError, ScreenerError};

pub use screener_store::SqliteScreenerSource;
pub use snapshot_store::SqliteSnapshotStore;
pub use trading_score_repository::TradingScoreRepository;

/// Database connection pool
pub type DbPool = SqlitePool;

/// Database initialization error
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<DatabaseError> for ScoringError {
    fn from(err: DatabaseError) -> Self {
        ScoringError::Persistence(err.to_string())
    }
}

impl From<DatabaseError> for ScreenerError {
    fn from(err: DatabaseError) -> Self {
        ScreenerError::DataSource(err.to_string())
    }
}

/// Initialize the database connection pool
///
/// # Arguments
/// - `database_url`: SQLite URL (e.g., "sqlite://data/equiscore.db" or "sqlite::memory:")
///
/// # Errors
/// Returns error if database connection fails or migrations fail
pub async fn init_database(database_url: &str) -> Result<DbPool, DatabaseError> {
    info!("Initializing database: {}", database_url);

    // Ensure data directory exists
    if let Some(db_path) = database_url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::ConnectionError(sqlx::Error::Configuration(Box::new(e)))
                })?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .log_statements(tracing::log::LevelFilter::Debug);

    // Every in-memory connection is its own database
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!("✓ Database initialized successfully");

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), DatabaseError> {
    info!("Running database migrations...");

    let tables: [(&str, &str); 8] = [
        (
            "trading_score",
            r#"
            CREATE TABLE IF NOT EXISTS trading_score (
                symbol TEXT PRIMARY KEY,
                technical_score REAL NOT NULL,
                fundamental_score REAL NOT NULL,
                news_sentiment_score REAL NOT NULL,
                social_sentiment_score REAL NOT NULL,
                analyst_score REAL NOT NULL,
                composite_score REAL NOT NULL,
                scored_at DATETIME NOT NULL
            )
            "#,
        ),
        (
            "fundamental_percentage",
            r#"
            CREATE TABLE IF NOT EXISTS fundamental_percentage (
                symbol TEXT PRIMARY KEY,
                valuation REAL NOT NULL,
                growth REAL NOT NULL,
                profitability REAL NOT NULL,
                balance_sheet REAL NOT NULL,
                earnings_quality REAL NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        ),
        (
            "metric_snapshots",
            r#"
            CREATE TABLE IF NOT EXISTS metric_snapshots (
                symbol TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ),
        (
            "securities",
            r#"
            CREATE TABLE IF NOT EXISTS securities (
                symbol TEXT PRIMARY KEY,
                company_name TEXT,
                sector TEXT,
                industry TEXT,
                market_cap REAL,
                is_priority BOOLEAN NOT NULL DEFAULT 0
            )
            "#,
        ),
        (
            "price_bars_daily",
            r#"
            CREATE TABLE IF NOT EXISTS price_bars_daily (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL,
                percent_change REAL,
                volume REAL,
                PRIMARY KEY (symbol, date)
            )
            "#,
        ),
        (
            "price_bars_weekly",
            r#"
            CREATE TABLE IF NOT EXISTS price_bars_weekly (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL,
                percent_change REAL,
                volume REAL,
                PRIMARY KEY (symbol, date)
            )
            "#,
        ),
        (
            "price_bars_monthly",
            r#"
            CREATE TABLE IF NOT EXISTS price_bars_monthly (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL,
                percent_change REAL,
                volume REAL,
                PRIMARY KEY (symbol, date)
            )
            "#,
        ),
        (
            "security_metrics",
            r#"
            CREATE TABLE IF NOT EXISTS security_metrics (
                symbol TEXT NOT NULL,
                metric TEXT NOT NULL,
                value REAL,
                PRIMARY KEY (symbol, metric)
            )
            "#,
        ),
    ];

    for (name, ddl) in tables {
        sqlx::query(ddl).execute(pool).await.map_err(|e| {
            DatabaseError::MigrationError(format!("Failed to create {} table: {}", name, e))
        })?;
    }

    // Create indexes for better query performance
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_trading_score_composite ON trading_score(composite_score)",
    )
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_securities_priority ON securities(is_priority)")
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    info!("✓ Database migrations completed successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_init() {
        let pool = init_database("sqlite::memory:").await;
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn test_migrations() {
        let pool = init_database("sqlite::memory:").await.unwrap();

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('trading_score', 'fundamental_percentage', 'metric_snapshots', 'securities', 'price_bars_daily', 'price_bars_weekly', 'price_bars_monthly', 'security_metrics')"
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(result.0, 8);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        assert!(run_migrations(&pool).await.is_ok());
    }

    #[test]
    fn test_error_conversion() {
        let err: ScoringError = DatabaseError::QueryError("boom".to_string()).into();
        assert_eq!(err, ScoringError::Persistence("Query error: boom".to_string()));

        let err: ScreenerError = DatabaseError::MigrationError("bad".to_string()).into();
        assert_eq!(
            err,
            ScreenerError::DataSource("Migration error: bad".to_string())
        );
    }
}
