//! Database Models
//!
//! Row shapes for the score, snapshot and screener tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::domain::entities::trading_score::{FundamentalPercentages, TradingScoreRecord};

/// trading_score joined with fundamental_percentage
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradingScoreRow {
    pub symbol: String,
    pub technical_score: f64,
    pub fundamental_score: f64,
    pub news_sentiment_score: f64,
    pub social_sentiment_score: f64,
    pub analyst_score: f64,
    pub composite_score: f64,
    pub scored_at: DateTime<Utc>,
    pub valuation: Option<f64>,
    pub growth: Option<f64>,
    pub profitability: Option<f64>,
    pub balance_sheet: Option<f64>,
    pub earnings_quality: Option<f64>,
}

impl From<TradingScoreRow> for TradingScoreRecord {
    fn from(row: TradingScoreRow) -> Self {
        TradingScoreRecord {
            symbol: row.symbol,
            technical_score: row.technical_score,
            fundamental_score: row.fundamental_score,
            news_sentiment_score: row.news_sentiment_score,
            social_sentiment_score: row.social_sentiment_score,
            analyst_score: row.analyst_score,
            composite_score: row.composite_score,
            fundamental_percentages: FundamentalPercentages {
                valuation: row.valuation.unwrap_or(0.0),
                growth: row.growth.unwrap_or(0.0),
                profitability: row.profitability.unwrap_or(0.0),
                balance_sheet: row.balance_sheet.unwrap_or(0.0),
                earnings_quality: row.earnings_quality.unwrap_or(0.0),
            },
            scored_at: row.scored_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FundamentalPercentageRow {
    pub symbol: String,
    pub valuation: f64,
    pub growth: f64,
    pub profitability: f64,
    pub balance_sheet: f64,
    pub earnings_quality: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<FundamentalPercentageRow> for FundamentalPercentages {
    fn from(row: FundamentalPercentageRow) -> Self {
        FundamentalPercentages {
            valuation: row.valuation,
            growth: row.growth,
            profitability: row.profitability,
            balance_sheet: row.balance_sheet,
            earnings_quality: row.earnings_quality,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRow {
    pub symbol: String,
    pub payload: String, // JSON string
}

/// Latest bar for a security joined with its reference data
#[derive(Debug, Clone, FromRow)]
pub struct LatestBarRow {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub is_priority: bool,
    pub close: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SecurityMetricRow {
    pub symbol: String,
    pub metric: String,
    pub value: Option<f64>,
}

/// Security reference data input
#[derive(Debug, Clone)]
pub struct CreateSecurity {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub is_priority: bool,
}

/// Price bar input
#[derive(Debug, Clone)]
pub struct CreatePriceBar {
    pub symbol: String,
    /// ISO date, compared lexically
    pub date: String,
    pub close: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<f64>,
}
