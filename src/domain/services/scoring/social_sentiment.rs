use serde::{Deserialize, Serialize};

use crate::domain::entities::snapshot::SocialSentiment;
use crate::domain::entities::trading_score::{clamp_score, round2, SOCIAL_SENTIMENT_WEIGHT};
use crate::domain::services::scoring::score_calculator::{CategoryScore, CategoryScoreCalculator};

pub const NEUTRAL_SOCIAL_SCORE: f64 = 50.0;

/// Social sentiment score breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialSentimentScore {
    /// (positive - negative) / total, in [-1, 1]; None when there are no mentions
    pub net_sentiment: Option<f64>,
    pub total_score: f64,
}

impl CategoryScore for SocialSentimentScore {
    fn total(&self) -> f64 {
        self.total_score
    }
}

/// Maps net mention sentiment onto [0, 100], 50 being neutral
#[derive(Debug, Clone, Default)]
pub struct SocialSentimentCalculator;

impl SocialSentimentCalculator {
    pub fn new() -> Self {
        SocialSentimentCalculator
    }
}

impl CategoryScoreCalculator for SocialSentimentCalculator {
    type Input = SocialSentiment;
    type Output = SocialSentimentScore;

    fn calculate(&self, social: &SocialSentiment) -> SocialSentimentScore {
        if social.total_mentions == 0 {
            return SocialSentimentScore {
                net_sentiment: None,
                total_score: NEUTRAL_SOCIAL_SCORE,
            };
        }

        let net = (social.positive_mentions as f64 - social.negative_mentions as f64)
            / social.total_mentions as f64;

        SocialSentimentScore {
            net_sentiment: Some(net),
            total_score: round2(clamp_score((net + 1.0) * 50.0)),
        }
    }

    fn name(&self) -> &str {
        "social_sentiment"
    }

    fn weight(&self) -> f64 {
        SOCIAL_SENTIMENT_WEIGHT
    }
}
