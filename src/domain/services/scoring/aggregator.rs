use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::domain::entities::snapshot::SecurityMetricSnapshot;
use crate::domain::entities::trading_score::{
    CategoryWeights, FundamentalPercentages, TradingScoreRecord,
};
use crate::domain::services::scoring::{
    AnalystInput, AnalystScore, AnalystScoreCalculator, CategoryScore, CategoryScoreCalculator,
    FundamentalInput, FundamentalScore, FundamentalScoreCalculator, NewsSentimentCalculator,
    NewsSentimentScore, SocialSentimentCalculator, SocialSentimentScore, TechnicalScore,
    TechnicalScoreCalculator,
};

/// Composite score plus every category breakdown that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingScoreReport {
    pub record: TradingScoreRecord,
    pub technical: Option<TechnicalScore>,
    pub fundamental: Option<FundamentalScore>,
    pub news_sentiment: Option<NewsSentimentScore>,
    pub social_sentiment: Option<SocialSentimentScore>,
    pub analyst: Option<AnalystScore>,
    /// Categories scored as 0 because the snapshot had no data for them
    pub missing_categories: Vec<String>,
}

/// Aggregates the five category scores into the weighted trading score.
///
/// A category with no data contributes 0; it never aborts the aggregation.
pub struct TradingScoreAggregator {
    technical_calc: TechnicalScoreCalculator,
    fundamental_calc: FundamentalScoreCalculator,
    news_calc: NewsSentimentCalculator,
    social_calc: SocialSentimentCalculator,
    analyst_calc: AnalystScoreCalculator,
}

impl Default for TradingScoreAggregator {
    fn default() -> Self {
        TradingScoreAggregator {
            technical_calc: TechnicalScoreCalculator::default(),
            fundamental_calc: FundamentalScoreCalculator::default(),
            news_calc: NewsSentimentCalculator::default(),
            social_calc: SocialSentimentCalculator::default(),
            analyst_calc: AnalystScoreCalculator::default(),
        }
    }
}

impl TradingScoreAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_news_sector_reference(default_sector_reference: f64) -> Self {
        TradingScoreAggregator {
            news_calc: NewsSentimentCalculator::new(default_sector_reference),
            ..Self::default()
        }
    }

    /// Composite weights as declared by each calculator
    pub fn weights(&self) -> CategoryWeights {
        CategoryWeights {
            technical: self.technical_calc.weight(),
            fundamental: self.fundamental_calc.weight(),
            news_sentiment: self.news_calc.weight(),
            social_sentiment: self.social_calc.weight(),
            analyst: self.analyst_calc.weight(),
        }
    }

    /// Score a snapshot and return the record that should be persisted
    pub fn compute_trading_score(&self, snapshot: &SecurityMetricSnapshot) -> TradingScoreRecord {
        self.calculate(snapshot).record
    }

    /// Score a snapshot, keeping every category breakdown
    pub fn calculate(&self, snapshot: &SecurityMetricSnapshot) -> TradingScoreReport {
        let symbol = snapshot.symbol.as_str();
        let mut missing_categories = Vec::new();

        debug!(symbol = %symbol, "Starting trading score calculation");

        let technical = snapshot
            .technical
            .as_ref()
            .map(|metrics| self.technical_calc.calculate(metrics));

        let fundamental = if snapshot.fundamental.is_some() || snapshot.earnings_quality.is_some() {
            Some(self.fundamental_calc.calculate(&FundamentalInput {
                metrics: snapshot.fundamental.clone().unwrap_or_default(),
                sector_benchmark: snapshot.sector_benchmark.clone(),
                earnings_quality: snapshot.earnings_quality,
            }))
        } else {
            None
        };

        let news_sentiment = snapshot
            .news_sentiment
            .as_ref()
            .map(|news| self.news_calc.calculate(news));

        let social_sentiment = snapshot
            .social_sentiment
            .as_ref()
            .map(|social| self.social_calc.calculate(social));

        let analyst = if snapshot.analyst.is_some() || snapshot.earnings.is_some() {
            Some(self.analyst_calc.calculate(&AnalystInput {
                analyst: snapshot.analyst.clone().unwrap_or_default(),
                earnings: snapshot.earnings.clone(),
            }))
        } else {
            None
        };

        let technical_score = Self::category_total(
            symbol,
            self.technical_calc.name(),
            technical.as_ref(),
            &mut missing_categories,
        );
        let fundamental_score = Self::category_total(
            symbol,
            self.fundamental_calc.name(),
            fundamental.as_ref(),
            &mut missing_categories,
        );
        let news_sentiment_score = Self::category_total(
            symbol,
            self.news_calc.name(),
            news_sentiment.as_ref(),
            &mut missing_categories,
        );
        let social_sentiment_score = Self::category_total(
            symbol,
            self.social_calc.name(),
            social_sentiment.as_ref(),
            &mut missing_categories,
        );
        let analyst_score = Self::category_total(
            symbol,
            self.analyst_calc.name(),
            analyst.as_ref(),
            &mut missing_categories,
        );

        let fundamental_percentages = fundamental
            .as_ref()
            .map(|f| f.percentages)
            .unwrap_or_else(FundamentalPercentages::default);

        let record = TradingScoreRecord::with_weights(
            &self.weights(),
            snapshot.symbol.clone(),
            technical_score,
            fundamental_score,
            news_sentiment_score,
            social_sentiment_score,
            analyst_score,
            fundamental_percentages,
        );

        debug!(
            symbol = %symbol,
            composite_score = record.composite_score,
            technical_score = record.technical_score,
            fundamental_score = record.fundamental_score,
            news_sentiment_score = record.news_sentiment_score,
            social_sentiment_score = record.social_sentiment_score,
            analyst_score = record.analyst_score,
            missing = ?missing_categories,
            "Completed trading score calculation"
        );

        TradingScoreReport {
            record,
            technical,
            fundamental,
            news_sentiment,
            social_sentiment,
            analyst,
            missing_categories,
        }
    }

    fn category_total<S: CategoryScore>(
        symbol: &str,
        name: &str,
        score: Option<&S>,
        missing: &mut Vec<String>,
    ) -> f64 {
        match score {
            Some(score) => score.total(),
            None => {
                warn!(symbol = %symbol, category = name, "No data for category, scoring it as 0");
                missing.push(name.to_string());
                0.0
            }
        }
    }

    /// Rank reports by composite score descending, ties broken by symbol
    pub fn rank(mut reports: Vec<TradingScoreReport>) -> Vec<TradingScoreReport> {
        reports.sort_by(|a, b| {
            b.record
                .composite_score
                .partial_cmp(&a.record.composite_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.record.symbol.cmp(&b.record.symbol))
        });

        for (rank, report) in reports.iter().enumerate() {
            debug!(
                rank = rank + 1,
                symbol = %report.record.symbol,
                composite_score = report.record.composite_score,
                "Ranked trading score"
            );
        }

        reports
    }
}
