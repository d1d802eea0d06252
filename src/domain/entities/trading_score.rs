use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TECHNICAL_WEIGHT: f64 = 0.20;
pub const FUNDAMENTAL_WEIGHT: f64 = 0.25;
pub const NEWS_SENTIMENT_WEIGHT: f64 = 0.15;
pub const SOCIAL_SENTIMENT_WEIGHT: f64 = 0.15;
pub const ANALYST_WEIGHT: f64 = 0.25;

/// Clamp a score to [0, 100]. NaN collapses to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fundamental sub-scores expressed as a percentage of their own maximum
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalPercentages {
    pub valuation: f64,
    pub growth: f64,
    pub profitability: f64,
    pub balance_sheet: f64,
    pub earnings_quality: f64,
}

/// Composite trading score for one security, upserted by symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingScoreRecord {
    pub symbol: String,
    /// Technical score [0, 100]
    pub technical_score: f64,
    /// Fundamental score [0, 100]
    pub fundamental_score: f64,
    /// News sentiment score [0, 100]
    pub news_sentiment_score: f64,
    /// Social sentiment score [0, 100]
    pub social_sentiment_score: f64,
    /// Analyst score [0, 100]
    pub analyst_score: f64,
    /// Weighted composite [0, 100], 2 decimals
    /// Formula: 0.20 * technical + 0.25 * fundamental + 0.15 * news + 0.15 * social + 0.25 * analyst
    pub composite_score: f64,
    pub fundamental_percentages: FundamentalPercentages,
    pub scored_at: DateTime<Utc>,
}

impl TradingScoreRecord {
    /// Build a record from the five category scores with the standard weights.
    ///
    /// Inputs are clamped to [0, 100] before weighting and the composite is
    /// clamped again after rounding.
    pub fn new(
        symbol: String,
        technical_score: f64,
        fundamental_score: f64,
        news_sentiment_score: f64,
        social_sentiment_score: f64,
        analyst_score: f64,
        fundamental_percentages: FundamentalPercentages,
    ) -> Self {
        Self::with_weights(
            &CategoryWeights::default(),
            symbol,
            technical_score,
            fundamental_score,
            news_sentiment_score,
            social_sentiment_score,
            analyst_score,
            fundamental_percentages,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_weights(
        weights: &CategoryWeights,
        symbol: String,
        technical_score: f64,
        fundamental_score: f64,
        news_sentiment_score: f64,
        social_sentiment_score: f64,
        analyst_score: f64,
        fundamental_percentages: FundamentalPercentages,
    ) -> Self {
        let technical_score = clamp_score(technical_score);
        let fundamental_score = clamp_score(fundamental_score);
        let news_sentiment_score = clamp_score(news_sentiment_score);
        let social_sentiment_score = clamp_score(social_sentiment_score);
        let analyst_score = clamp_score(analyst_score);

        let composite_score = weights.composite(
            technical_score,
            fundamental_score,
            news_sentiment_score,
            social_sentiment_score,
            analyst_score,
        );

        TradingScoreRecord {
            symbol,
            technical_score,
            fundamental_score,
            news_sentiment_score,
            social_sentiment_score,
            analyst_score,
            composite_score,
            fundamental_percentages,
            scored_at: Utc::now(),
        }
    }

    /// Weighted sum of the five category scores with the standard weights
    pub fn composite(
        technical: f64,
        fundamental: f64,
        news_sentiment: f64,
        social_sentiment: f64,
        analyst: f64,
    ) -> f64 {
        CategoryWeights::default().composite(
            technical,
            fundamental,
            news_sentiment,
            social_sentiment,
            analyst,
        )
    }
}

/// Contribution of each category to the composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub technical: f64,
    pub fundamental: f64,
    pub news_sentiment: f64,
    pub social_sentiment: f64,
    pub analyst: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        CategoryWeights {
            technical: TECHNICAL_WEIGHT,
            fundamental: FUNDAMENTAL_WEIGHT,
            news_sentiment: NEWS_SENTIMENT_WEIGHT,
            social_sentiment: SOCIAL_SENTIMENT_WEIGHT,
            analyst: ANALYST_WEIGHT,
        }
    }
}

impl CategoryWeights {
    /// Weighted sum of clamped category scores, rounded to 2 decimals
    pub fn composite(
        &self,
        technical: f64,
        fundamental: f64,
        news_sentiment: f64,
        social_sentiment: f64,
        analyst: f64,
    ) -> f64 {
        let weighted = self.technical * clamp_score(technical)
            + self.fundamental * clamp_score(fundamental)
            + self.news_sentiment * clamp_score(news_sentiment)
            + self.social_sentiment * clamp_score(social_sentiment)
            + self.analyst * clamp_score(analyst);
        clamp_score(round2(weighted))
    }
}
