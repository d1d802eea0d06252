use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error};

use super::models::SnapshotRow;
use super::{DatabaseError, DbPool};
use crate::domain::entities::snapshot::SecurityMetricSnapshot;
use crate::domain::errors::ScoringError;
use crate::domain::repositories::SnapshotReader;

/// Metric snapshots stored as JSON payloads, one per symbol
#[derive(Clone)]
pub struct SqliteSnapshotStore {
    pool: DbPool,
}

impl SqliteSnapshotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the snapshot for `snapshot.symbol`
    pub async fn save(&self, snapshot: &SecurityMetricSnapshot) -> Result<(), DatabaseError> {
        let payload = serde_json::to_string(snapshot).map_err(|e| {
            DatabaseError::Serialization(format!(
                "Failed to encode snapshot {}: {}",
                snapshot.symbol, e
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO metric_snapshots (symbol, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(symbol) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&snapshot.symbol)
        .bind(&payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to save snapshot {}: {}", snapshot.symbol, e);
            DatabaseError::QueryError(format!("Failed to save snapshot: {}", e))
        })?;

        debug!("Saved snapshot for {}", snapshot.symbol);
        Ok(())
    }

    pub async fn find(&self, symbol: &str) -> Result<Option<SecurityMetricSnapshot>, DatabaseError> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            "SELECT symbol, payload FROM metric_snapshots WHERE symbol = ?1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to load snapshot {}: {}", symbol, e);
            DatabaseError::QueryError(format!("Failed to load snapshot: {}", e))
        })?;

        row.map(|row| {
            serde_json::from_str::<SecurityMetricSnapshot>(&row.payload).map_err(|e| {
                DatabaseError::Serialization(format!(
                    "Failed to decode snapshot {}: {}",
                    row.symbol, e
                ))
            })
        })
        .transpose()
    }

    pub async fn symbols(&self) -> Result<Vec<String>, DatabaseError> {
        sqlx::query_scalar::<_, String>("SELECT symbol FROM metric_snapshots ORDER BY symbol")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to list snapshot symbols: {}", e);
                DatabaseError::QueryError(format!("Failed to list snapshot symbols: {}", e))
            })
    }
}

#[async_trait]
impl SnapshotReader for SqliteSnapshotStore {
    async fn load_snapshot(&self, symbol: &str) -> Result<SecurityMetricSnapshot, ScoringError> {
        match self.find(symbol).await? {
            Some(mut snapshot) => {
                // The row key is authoritative
                snapshot.symbol = symbol.to_string();
                Ok(snapshot)
            }
            None => Err(ScoringError::NotFound {
                symbol: symbol.to_string(),
            }),
        }
    }

    async fn list_symbols(&self) -> Result<Vec<String>, ScoringError> {
        Ok(self.symbols().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::snapshot::{EarningsQualityGrade, TechnicalMetrics};
    use crate::persistence::init_database;

    #[tokio::test]
    async fn test_save_and_load_snapshot() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let store = SqliteSnapshotStore::new(pool);

        let mut snapshot = SecurityMetricSnapshot::new("NVDA");
        snapshot.technical = Some(TechnicalMetrics {
            rsi: Some(62.0),
            ..Default::default()
        });
        snapshot.earnings_quality = Some(EarningsQualityGrade::BPlus);
        store.save(&snapshot).await.unwrap();

        let loaded = store.load_snapshot("NVDA").await.unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(store.list_symbols().await.unwrap(), vec!["NVDA"]);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_not_found() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let store = SqliteSnapshotStore::new(pool);

        assert_eq!(
            store.load_snapshot("NOPE").await.unwrap_err(),
            ScoringError::NotFound {
                symbol: "NOPE".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_earnings_grade_loads_without_grade() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        sqlx::query(
            r#"INSERT INTO metric_snapshots (symbol, payload) VALUES ('EMPTY', '{"symbol":"EMPTY","earnings_quality":"","technical":{"rsi":40.0}}')"#,
        )
        .execute(&pool)
        .await
        .unwrap();
        let store = SqliteSnapshotStore::new(pool);

        let loaded = store.load_snapshot("EMPTY").await.unwrap();
        assert_eq!(loaded.earnings_quality, None);
        assert_eq!(loaded.technical.unwrap().rsi, Some(40.0));
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_reported() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO metric_snapshots (symbol, payload) VALUES ('BAD', 'not json')")
            .execute(&pool)
            .await
            .unwrap();
        let store = SqliteSnapshotStore::new(pool);

        assert!(matches!(
            store.load_snapshot("BAD").await,
            Err(ScoringError::Persistence(_))
        ));
    }
}
