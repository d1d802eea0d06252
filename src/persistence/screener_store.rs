//! SQLite-backed screener data: securities, price bars per window and named
//! metric values, joined into one record per security from its latest bar.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error};

use super::models::{CreatePriceBar, CreateSecurity, LatestBarRow, SecurityMetricRow};
use super::{DatabaseError, DbPool};
use crate::domain::entities::screener::ScreenerRecord;
use crate::domain::errors::ScreenerError;
use crate::domain::repositories::ScreenerDataSource;
use crate::domain::services::screener::dimension_filters::PerformanceWindow;
use crate::domain::services::screener::fields::MetricField;

#[derive(Clone)]
pub struct SqliteScreenerSource {
    pool: DbPool,
}

impl SqliteScreenerSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_security(&self, security: &CreateSecurity) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO securities (symbol, company_name, sector, industry, market_cap, is_priority)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(symbol) DO UPDATE SET
                company_name = excluded.company_name,
                sector = excluded.sector,
                industry = excluded.industry,
                market_cap = excluded.market_cap,
                is_priority = excluded.is_priority
            "#,
        )
        .bind(&security.symbol)
        .bind(&security.company_name)
        .bind(&security.sector)
        .bind(&security.industry)
        .bind(security.market_cap)
        .bind(security.is_priority)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to upsert security {}: {}", security.symbol, e);
            DatabaseError::QueryError(format!("Failed to upsert security: {}", e))
        })?;

        Ok(())
    }

    pub async fn upsert_bar(
        &self,
        window: PerformanceWindow,
        bar: &CreatePriceBar,
    ) -> Result<(), DatabaseError> {
        // Table names come from a closed enum, never from input
        let sql = format!(
            r#"
            INSERT INTO {} (symbol, date, close, percent_change, volume)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(symbol, date) DO UPDATE SET
                close = excluded.close,
                percent_change = excluded.percent_change,
                volume = excluded.volume
            "#,
            window.table_name()
        );

        sqlx::query(&sql)
            .bind(&bar.symbol)
            .bind(&bar.date)
            .bind(bar.close)
            .bind(bar.percent_change)
            .bind(bar.volume)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to upsert {} bar for {}: {}", window, bar.symbol, e);
                DatabaseError::QueryError(format!("Failed to upsert price bar: {}", e))
            })?;

        Ok(())
    }

    pub async fn upsert_metric(
        &self,
        symbol: &str,
        metric: MetricField,
        value: f64,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO security_metrics (symbol, metric, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(symbol, metric) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(symbol)
        .bind(metric.as_str())
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to upsert metric {} for {}: {}", metric, symbol, e);
            DatabaseError::QueryError(format!("Failed to upsert metric: {}", e))
        })?;

        Ok(())
    }

    async fn latest_bars(&self, window: PerformanceWindow) -> Result<Vec<LatestBarRow>, DatabaseError> {
        let table = window.table_name();
        let sql = format!(
            r#"
            SELECT s.symbol, s.company_name, s.sector, s.industry, s.market_cap, s.is_priority,
                   b.close, b.percent_change, b.volume
            FROM securities s
            JOIN {table} b ON b.symbol = s.symbol
            WHERE b.date = (SELECT MAX(date) FROM {table} WHERE symbol = s.symbol)
            ORDER BY s.symbol
            "#
        );

        sqlx::query_as::<_, LatestBarRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to load latest {} bars: {}", window, e);
                DatabaseError::QueryError(format!("Failed to load latest bars: {}", e))
            })
    }

    async fn metrics_by_symbol(
        &self,
    ) -> Result<HashMap<String, Vec<(MetricField, f64)>>, DatabaseError> {
        let rows = sqlx::query_as::<_, SecurityMetricRow>(
            "SELECT symbol, metric, value FROM security_metrics",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to load security metrics: {}", e);
            DatabaseError::QueryError(format!("Failed to load security metrics: {}", e))
        })?;

        let mut grouped: HashMap<String, Vec<(MetricField, f64)>> = HashMap::new();
        for row in rows {
            let Some(value) = row.value else { continue };
            match row.metric.parse::<MetricField>() {
                Ok(field) if !field.is_text() => {
                    grouped.entry(row.symbol).or_default().push((field, value));
                }
                _ => debug!(symbol = %row.symbol, metric = %row.metric, "Skipping unrecognized metric"),
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl ScreenerDataSource for SqliteScreenerSource {
    async fn latest_rows(
        &self,
        window: PerformanceWindow,
    ) -> Result<Vec<ScreenerRecord>, ScreenerError> {
        let bars = self.latest_bars(window).await?;
        let mut metrics = self.metrics_by_symbol().await?;

        let records = bars
            .into_iter()
            .map(|bar| {
                let mut record = ScreenerRecord {
                    symbol: bar.symbol,
                    company_name: bar.company_name,
                    sector: bar.sector,
                    industry: bar.industry,
                    market_cap: bar.market_cap,
                    close: bar.close,
                    percent_change: bar.percent_change,
                    volume: bar.volume,
                    is_priority: bar.is_priority,
                    metrics: HashMap::new(),
                };
                for (field, value) in metrics.remove(&record.symbol).unwrap_or_default() {
                    let column = match field {
                        MetricField::MarketCap => Some(&mut record.market_cap),
                        MetricField::Close => Some(&mut record.close),
                        MetricField::PercentChange => Some(&mut record.percent_change),
                        MetricField::Volume => Some(&mut record.volume),
                        _ => None,
                    };
                    match column {
                        // Bar and reference columns win over the metric table
                        Some(slot) => {
                            slot.get_or_insert(value);
                        }
                        None => {
                            record.metrics.insert(field, value);
                        }
                    }
                }
                record
            })
            .collect::<Vec<_>>();

        debug!(window = %window, rows = records.len(), "Loaded latest screener rows");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::init_database;

    fn security(symbol: &str, priority: bool) -> CreateSecurity {
        CreateSecurity {
            symbol: symbol.to_string(),
            company_name: Some(format!("{} Corp", symbol)),
            sector: Some("Technology".to_string()),
            industry: Some("Software".to_string()),
            market_cap: Some(5_000_000_000.0),
            is_priority: priority,
        }
    }

    fn bar(symbol: &str, date: &str, close: f64) -> CreatePriceBar {
        CreatePriceBar {
            symbol: symbol.to_string(),
            date: date.to_string(),
            close: Some(close),
            percent_change: Some(1.0),
            volume: Some(1_000.0),
        }
    }

    #[tokio::test]
    async fn test_latest_rows_use_most_recent_bar() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let source = SqliteScreenerSource::new(pool);

        source.upsert_security(&security("ACME", true)).await.unwrap();
        source
            .upsert_bar(PerformanceWindow::Daily, &bar("ACME", "2024-01-02", 10.0))
            .await
            .unwrap();
        source
            .upsert_bar(PerformanceWindow::Daily, &bar("ACME", "2024-01-03", 11.0))
            .await
            .unwrap();
        source
            .upsert_bar(PerformanceWindow::Weekly, &bar("ACME", "2023-12-29", 9.5))
            .await
            .unwrap();
        source.upsert_metric("ACME", MetricField::PeTtm, 12.0).await.unwrap();

        let daily = source.latest_rows(PerformanceWindow::Daily).await.unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].close, Some(11.0));
        assert_eq!(daily[0].metrics.get(&MetricField::PeTtm), Some(&12.0));
        assert_eq!(daily[0].company_name.as_deref(), Some("ACME Corp"));

        let weekly = source.latest_rows(PerformanceWindow::Weekly).await.unwrap();
        assert_eq!(weekly[0].close, Some(9.5));

        let monthly = source.latest_rows(PerformanceWindow::Monthly).await.unwrap();
        assert!(monthly.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_metrics_are_skipped() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO security_metrics (symbol, metric, value) VALUES ('ACME', 'mystery', 1.0)")
            .execute(&pool)
            .await
            .unwrap();
        let source = SqliteScreenerSource::new(pool);
        source.upsert_security(&security("ACME", false)).await.unwrap();
        source
            .upsert_bar(PerformanceWindow::Daily, &bar("ACME", "2024-01-02", 10.0))
            .await
            .unwrap();

        let rows = source.latest_rows(PerformanceWindow::Daily).await.unwrap();
        assert!(rows[0].metrics.is_empty());
        assert!(!rows[0].is_priority);
    }
}
