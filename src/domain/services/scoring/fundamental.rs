use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::snapshot::{
    EarningsQualityGrade, FundamentalMetrics, SectorBenchmark,
};
use crate::domain::entities::trading_score::{
    clamp_score, round2, FundamentalPercentages, FUNDAMENTAL_WEIGHT,
};
use crate::domain::services::scoring::score_calculator::{
    higher_is_better, lower_is_better, CategoryScore, CategoryScoreCalculator,
};

pub const VALUATION_MAX: f64 = 30.0;
pub const GROWTH_MAX: f64 = 30.0;
pub const PROFITABILITY_MAX: f64 = 30.0;
pub const BALANCE_SHEET_MAX: f64 = 10.0;
pub const EARNINGS_QUALITY_MAX: f64 = 25.0;

/// Inputs for the fundamental calculator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalInput {
    pub metrics: FundamentalMetrics,
    pub sector_benchmark: Option<SectorBenchmark>,
    pub earnings_quality: Option<EarningsQualityGrade>,
}

/// Company ratio divided by its sector average, when both are usable
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorComparison {
    pub pe_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub ev_to_ebitda_ratio: Option<f64>,
    pub net_margin_ratio: Option<f64>,
    pub roe_ratio: Option<f64>,
}

/// Fundamental score breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalScore {
    /// [0, 30]
    pub valuation: f64,
    /// [0, 30]
    pub growth: f64,
    /// [0, 30]
    pub profitability: f64,
    /// [0, 10]
    pub balance_sheet: f64,
    /// [0, 25]
    pub earnings_quality: f64,
    /// Unclamped sum of the five sub-scores [0, 125]
    pub raw_total: f64,
    /// raw_total clamped to [0, 100]
    pub total_score: f64,
    pub percentages: FundamentalPercentages,
    /// Informational, never part of the total
    pub sector_comparison: Option<SectorComparison>,
}

impl CategoryScore for FundamentalScore {
    fn total(&self) -> f64 {
        self.total_score
    }
}

/// Scores valuation, growth, profitability, balance sheet and earnings quality
#[derive(Debug, Clone, Default)]
pub struct FundamentalScoreCalculator;

impl FundamentalScoreCalculator {
    pub fn new() -> Self {
        FundamentalScoreCalculator
    }

    pub fn valuation_score(metrics: &FundamentalMetrics) -> f64 {
        let pe = metrics
            .pe_ttm
            .map_or(0.0, |pe| lower_is_better(pe, 10.0, 25.0, 10.0));
        let ps = metrics
            .ps_ttm
            .map_or(0.0, |ps| lower_is_better(ps, 2.0, 5.0, 10.0));
        let ev_ebitda = metrics
            .ev_to_ebitda
            .map_or(0.0, |ev| lower_is_better(ev, 10.0, 20.0, 10.0));
        pe + ps + ev_ebitda
    }

    pub fn growth_score(metrics: &FundamentalMetrics) -> f64 {
        let revenue = metrics
            .revenue_growth_yoy
            .map_or(0.0, |g| higher_is_better(g, 5.0, 30.0, 15.0));
        let eps = metrics
            .eps_growth_yoy
            .map_or(0.0, |g| higher_is_better(g, 5.0, 20.0, 15.0));
        revenue + eps
    }

    pub fn profitability_score(metrics: &FundamentalMetrics) -> f64 {
        let net_margin = metrics
            .net_margin
            .map_or(0.0, |m| higher_is_better(m, 5.0, 20.0, 10.0));
        let roe = metrics
            .roe
            .map_or(0.0, |r| higher_is_better(r, 5.0, 25.0, 10.0));
        let gross_margin = metrics
            .gross_margin
            .map_or(0.0, |m| higher_is_better(m, 20.0, 50.0, 10.0));
        net_margin + roe + gross_margin
    }

    pub fn balance_sheet_score(metrics: &FundamentalMetrics) -> f64 {
        metrics
            .debt_to_equity
            .map_or(0.0, |de| lower_is_better(de, 1.0, 2.0, BALANCE_SHEET_MAX))
    }

    pub fn earnings_quality_score(grade: Option<EarningsQualityGrade>) -> f64 {
        grade.map_or(0.0, |g| g.points())
    }

    pub fn sector_comparison(
        metrics: &FundamentalMetrics,
        sector: &SectorBenchmark,
    ) -> SectorComparison {
        fn ratio(company: Option<f64>, sector: Option<f64>) -> Option<f64> {
            match (company, sector) {
                (Some(c), Some(s)) if s != 0.0 => Some(round2(c / s)),
                _ => None,
            }
        }

        SectorComparison {
            pe_ratio: ratio(metrics.pe_ttm, sector.pe_ttm),
            ps_ratio: ratio(metrics.ps_ttm, sector.ps_ttm),
            ev_to_ebitda_ratio: ratio(metrics.ev_to_ebitda, sector.ev_to_ebitda),
            net_margin_ratio: ratio(metrics.net_margin, sector.net_margin),
            roe_ratio: ratio(metrics.roe, sector.roe),
        }
    }

    fn percentage(score: f64, max: f64) -> f64 {
        round2(clamp_score(score / max * 100.0))
    }
}

impl CategoryScoreCalculator for FundamentalScoreCalculator {
    type Input = FundamentalInput;
    type Output = FundamentalScore;

    fn calculate(&self, input: &FundamentalInput) -> FundamentalScore {
        let metrics = &input.metrics;

        let valuation = Self::valuation_score(metrics);
        let growth = Self::growth_score(metrics);
        let profitability = Self::profitability_score(metrics);
        let balance_sheet = Self::balance_sheet_score(metrics);
        let earnings_quality = Self::earnings_quality_score(input.earnings_quality);

        let raw_total = valuation + growth + profitability + balance_sheet + earnings_quality;

        debug!(
            valuation,
            growth,
            profitability,
            balance_sheet,
            earnings_quality,
            raw_total,
            "Calculated fundamental sub-scores"
        );

        let percentages = FundamentalPercentages {
            valuation: Self::percentage(valuation, VALUATION_MAX),
            growth: Self::percentage(growth, GROWTH_MAX),
            profitability: Self::percentage(profitability, PROFITABILITY_MAX),
            balance_sheet: Self::percentage(balance_sheet, BALANCE_SHEET_MAX),
            earnings_quality: Self::percentage(earnings_quality, EARNINGS_QUALITY_MAX),
        };

        FundamentalScore {
            valuation: round2(valuation),
            growth: round2(growth),
            profitability: round2(profitability),
            balance_sheet: round2(balance_sheet),
            earnings_quality,
            raw_total: round2(raw_total),
            total_score: round2(clamp_score(raw_total)),
            percentages,
            sector_comparison: input
                .sector_benchmark
                .as_ref()
                .map(|sector| Self::sector_comparison(metrics, sector)),
        }
    }

    fn name(&self) -> &str {
        "fundamental"
    }

    fn weight(&self) -> f64 {
        FUNDAMENTAL_WEIGHT
    }
}
