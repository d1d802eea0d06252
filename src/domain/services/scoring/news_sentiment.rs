use serde::{Deserialize, Serialize};

use crate::domain::entities::snapshot::NewsSentiment;
use crate::domain::entities::trading_score::{clamp_score, round2, NEWS_SENTIMENT_WEIGHT};
use crate::domain::services::scoring::score_calculator::{CategoryScore, CategoryScoreCalculator};

/// Sector news reference when neither the snapshot nor the caller supplies one
pub const DEFAULT_SECTOR_REFERENCE: f64 = 0.5;

/// News sentiment score breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSentimentScore {
    /// company_news_score * 100
    pub base_score: f64,
    /// +5 when the company beats its sector reference
    pub sector_bonus: f64,
    /// +10 when bullish percent > 60
    pub bullish_bonus: f64,
    /// -5 when bullish + bearish < 20
    pub coverage_penalty: f64,
    pub total_score: f64,
}

impl CategoryScore for NewsSentimentScore {
    fn total(&self) -> f64 {
        self.total_score
    }
}

/// Scores company news sentiment against a sector reference
#[derive(Debug, Clone)]
pub struct NewsSentimentCalculator {
    /// Used when the snapshot carries no sector-average news score
    pub default_sector_reference: f64,
}

impl Default for NewsSentimentCalculator {
    fn default() -> Self {
        NewsSentimentCalculator {
            default_sector_reference: DEFAULT_SECTOR_REFERENCE,
        }
    }
}

impl NewsSentimentCalculator {
    pub fn new(default_sector_reference: f64) -> Self {
        NewsSentimentCalculator {
            default_sector_reference,
        }
    }
}

impl CategoryScoreCalculator for NewsSentimentCalculator {
    type Input = NewsSentiment;
    type Output = NewsSentimentScore;

    fn calculate(&self, news: &NewsSentiment) -> NewsSentimentScore {
        let base_score = news.company_news_score.map_or(0.0, |s| s * 100.0);

        let sector_reference = news
            .sector_average_news_score
            .unwrap_or(self.default_sector_reference);
        let sector_bonus = match news.company_news_score {
            Some(score) if score > sector_reference => 5.0,
            _ => 0.0,
        };

        let bullish_bonus = match news.bullish_percent {
            Some(bullish) if bullish > 60.0 => 10.0,
            _ => 0.0,
        };

        // Only penalize low coverage when the source reported both sides
        let coverage_penalty = match (news.bullish_percent, news.bearish_percent) {
            (Some(bullish), Some(bearish)) if bullish + bearish < 20.0 => -5.0,
            _ => 0.0,
        };

        let total = base_score + sector_bonus + bullish_bonus + coverage_penalty;

        NewsSentimentScore {
            base_score: round2(base_score),
            sector_bonus,
            bullish_bonus,
            coverage_penalty,
            total_score: round2(clamp_score(total)),
        }
    }

    fn name(&self) -> &str {
        "news_sentiment"
    }

    fn weight(&self) -> f64 {
        NEWS_SENTIMENT_WEIGHT
    }
}
