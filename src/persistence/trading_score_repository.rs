//! Trading Score Repository
//!
//! One row per symbol in `trading_score` and `fundamental_percentage`.
//! Both rows are written in a single transaction so a reader never sees a
//! composite without the matching percentages.

use super::models::{FundamentalPercentageRow, TradingScoreRow};
use super::{DatabaseError, DbPool};
use crate::domain::entities::trading_score::{FundamentalPercentages, TradingScoreRecord};
use tracing::{debug, error};

const SELECT_JOINED: &str = r#"
    SELECT t.symbol, t.technical_score, t.fundamental_score, t.news_sentiment_score,
           t.social_sentiment_score, t.analyst_score, t.composite_score, t.scored_at,
           f.valuation, f.growth, f.profitability, f.balance_sheet, f.earnings_quality
    FROM trading_score t
    LEFT JOIN fundamental_percentage f ON f.symbol = t.symbol
"#;

#[derive(Clone)]
pub struct TradingScoreRepository {
    pool: DbPool,
}

impl TradingScoreRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the score and percentages for `record.symbol`
    pub async fn upsert(&self, record: &TradingScoreRecord) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to open transaction for {}: {}", record.symbol, e);
            DatabaseError::QueryError(format!("Failed to open transaction: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO trading_score (
                symbol, technical_score, fundamental_score, news_sentiment_score,
                social_sentiment_score, analyst_score, composite_score, scored_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(symbol) DO UPDATE SET
                technical_score = excluded.technical_score,
                fundamental_score = excluded.fundamental_score,
                news_sentiment_score = excluded.news_sentiment_score,
                social_sentiment_score = excluded.social_sentiment_score,
                analyst_score = excluded.analyst_score,
                composite_score = excluded.composite_score,
                scored_at = excluded.scored_at
            "#,
        )
        .bind(&record.symbol)
        .bind(record.technical_score)
        .bind(record.fundamental_score)
        .bind(record.news_sentiment_score)
        .bind(record.social_sentiment_score)
        .bind(record.analyst_score)
        .bind(record.composite_score)
        .bind(record.scored_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to upsert trading score for {}: {}", record.symbol, e);
            DatabaseError::QueryError(format!("Failed to upsert trading score: {}", e))
        })?;

        let pct = &record.fundamental_percentages;
        sqlx::query(
            r#"
            INSERT INTO fundamental_percentage (
                symbol, valuation, growth, profitability, balance_sheet, earnings_quality, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(symbol) DO UPDATE SET
                valuation = excluded.valuation,
                growth = excluded.growth,
                profitability = excluded.profitability,
                balance_sheet = excluded.balance_sheet,
                earnings_quality = excluded.earnings_quality,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.symbol)
        .bind(pct.valuation)
        .bind(pct.growth)
        .bind(pct.profitability)
        .bind(pct.balance_sheet)
        .bind(pct.earnings_quality)
        .bind(record.scored_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(
                "Failed to upsert fundamental percentages for {}: {}",
                record.symbol, e
            );
            DatabaseError::QueryError(format!("Failed to upsert fundamental percentages: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit trading score for {}: {}", record.symbol, e);
            DatabaseError::QueryError(format!("Failed to commit trading score: {}", e))
        })?;

        debug!(
            symbol = %record.symbol,
            composite_score = record.composite_score,
            "Upserted trading score"
        );
        Ok(())
    }

    pub async fn get(&self, symbol: &str) -> Result<Option<TradingScoreRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, TradingScoreRow>(&format!(
            "{} WHERE t.symbol = ?1",
            SELECT_JOINED
        ))
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get trading score {}: {}", symbol, e);
            DatabaseError::QueryError(format!("Failed to get trading score: {}", e))
        })?;

        Ok(row.map(TradingScoreRecord::from))
    }

    pub async fn get_fundamental_percentages(
        &self,
        symbol: &str,
    ) -> Result<Option<FundamentalPercentages>, DatabaseError> {
        let row = sqlx::query_as::<_, FundamentalPercentageRow>(
            "SELECT * FROM fundamental_percentage WHERE symbol = ?1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get fundamental percentages {}: {}", symbol, e);
            DatabaseError::QueryError(format!("Failed to get fundamental percentages: {}", e))
        })?;

        Ok(row.map(FundamentalPercentages::from))
    }

    /// Highest composite scores first, ties by symbol
    pub async fn top(&self, limit: i64) -> Result<Vec<TradingScoreRecord>, DatabaseError> {
        let rows = sqlx::query_as::<_, TradingScoreRow>(&format!(
            "{} ORDER BY t.composite_score DESC, t.symbol ASC LIMIT ?1",
            SELECT_JOINED
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get top trading scores: {}", e);
            DatabaseError::QueryError(format!("Failed to get top trading scores: {}", e))
        })?;

        Ok(rows.into_iter().map(TradingScoreRecord::from).collect())
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trading_score")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to count trading scores: {}", e);
                DatabaseError::QueryError(format!("Failed to count trading scores: {}", e))
            })?;

        Ok(count.0)
    }
}
