use serde::{Deserialize, Serialize};

use crate::domain::entities::snapshot::{AnalystMetrics, EarningsRecord};
use crate::domain::entities::trading_score::{clamp_score, round2, ANALYST_WEIGHT};
use crate::domain::services::scoring::score_calculator::{CategoryScore, CategoryScoreCalculator};

/// Maximum of recommendation (15) + price target (10) + earnings surprise (10)
pub const ANALYST_SCALE: f64 = 35.0;

const IN_LINE_TOLERANCE: f64 = 0.01;
const FLOAT_EPSILON: f64 = 1e-9;

/// Inputs for the analyst calculator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalystInput {
    pub analyst: AnalystMetrics,
    pub earnings: Option<EarningsRecord>,
}

/// Analyst score breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalystScore {
    /// 0, 10 or 15
    pub recommendation_score: f64,
    /// 0, 5 or 10
    pub price_target_score: f64,
    /// 0, 5 or 10
    pub earnings_surprise_score: f64,
    /// Sum out of 35
    pub raw_score: f64,
    /// raw_score rescaled to [0, 100]
    pub total_score: f64,
}

impl CategoryScore for AnalystScore {
    fn total(&self) -> f64 {
        self.total_score
    }
}

/// Scores analyst consensus, price target upside and the last earnings surprise
#[derive(Debug, Clone, Default)]
pub struct AnalystScoreCalculator;

impl AnalystScoreCalculator {
    pub fn new() -> Self {
        AnalystScoreCalculator
    }

    pub fn recommendation_score(analyst: &AnalystMetrics) -> f64 {
        let total = analyst.total_ratings();
        if total == 0 {
            return 0.0;
        }
        let bullish = u64::from(analyst.buy) + u64::from(analyst.strong_buy);
        let bullish_ratio = bullish as f64 / total as f64;
        if bullish_ratio >= 0.70 {
            15.0
        } else if bullish_ratio >= 0.50 {
            10.0
        } else {
            0.0
        }
    }

    pub fn price_target_score(analyst: &AnalystMetrics) -> f64 {
        let Some(target) = analyst.target_median else {
            return 0.0;
        };
        let upside = match analyst.current_price {
            Some(price) if price > 0.0 => target / price,
            _ => 1.0,
        };
        if upside >= 1.20 {
            10.0
        } else if upside >= 1.10 {
            5.0
        } else {
            0.0
        }
    }

    /// In-line is checked before beat, so a 0.01 beat still scores 5
    pub fn earnings_surprise_score(earnings: Option<&EarningsRecord>) -> f64 {
        let Some((estimate, actual)) =
            earnings.and_then(|e| Some((e.eps_estimate?, e.eps_actual?)))
        else {
            return 0.0;
        };

        if (actual - estimate).abs() <= IN_LINE_TOLERANCE + FLOAT_EPSILON {
            5.0
        } else if actual > estimate {
            10.0
        } else {
            0.0
        }
    }
}

impl CategoryScoreCalculator for AnalystScoreCalculator {
    type Input = AnalystInput;
    type Output = AnalystScore;

    fn calculate(&self, input: &AnalystInput) -> AnalystScore {
        let recommendation_score = Self::recommendation_score(&input.analyst);
        let price_target_score = Self::price_target_score(&input.analyst);
        let earnings_surprise_score = Self::earnings_surprise_score(input.earnings.as_ref());

        let raw_score = recommendation_score + price_target_score + earnings_surprise_score;

        AnalystScore {
            recommendation_score,
            price_target_score,
            earnings_surprise_score,
            raw_score,
            total_score: round2(clamp_score(raw_score / ANALYST_SCALE * 100.0)),
        }
    }

    fn name(&self) -> &str {
        "analyst"
    }

    fn weight(&self) -> f64 {
        ANALYST_WEIGHT
    }
}
