//! Registry of named screener presets.
//!
//! One list per category; at most one preset per category is active in a query.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::fields::MetricField;
use super::predicate::{Comparator, Predicate};
use crate::domain::errors::ScreenerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetCategory {
    Fundamental,
    Technical,
    TechnicalAdvanced,
    FundamentalAdvanced,
}

impl PresetCategory {
    pub const ALL: [PresetCategory; 4] = [
        PresetCategory::Fundamental,
        PresetCategory::Technical,
        PresetCategory::TechnicalAdvanced,
        PresetCategory::FundamentalAdvanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetCategory::Fundamental => "fundamental",
            PresetCategory::Technical => "technical",
            PresetCategory::TechnicalAdvanced => "technical_advanced",
            PresetCategory::FundamentalAdvanced => "fundamental_advanced",
        }
    }
}

impl fmt::Display for PresetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PresetCategory {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        PresetCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == key)
            .ok_or_else(|| ScreenerError::UnknownCategory(s.to_string()))
    }
}

/// A named, immutable screening rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenerPreset {
    pub key: &'static str,
    pub category: PresetCategory,
    pub description: &'static str,
    pub predicate: Predicate,
}

/// Static preset catalog, ordered by declaration within each category
pub struct PresetCatalog {
    presets: BTreeMap<PresetCategory, Vec<ScreenerPreset>>,
}

static CATALOG: Lazy<PresetCatalog> = Lazy::new(PresetCatalog::build);

impl PresetCatalog {
    pub fn global() -> &'static PresetCatalog {
        &CATALOG
    }

    /// Preset keys accepted for a category
    pub fn keys(&self, category: PresetCategory) -> Vec<&'static str> {
        self.presets
            .get(&category)
            .map(|presets| presets.iter().map(|p| p.key).collect())
            .unwrap_or_default()
    }

    pub fn presets(&self, category: PresetCategory) -> &[ScreenerPreset] {
        self.presets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a preset, failing fast on unknown keys
    pub fn get(&self, category: PresetCategory, key: &str) -> Result<&ScreenerPreset, ScreenerError> {
        let normalized = key.trim().to_lowercase();
        self.presets(category)
            .iter()
            .find(|preset| preset.key == normalized)
            .ok_or_else(|| ScreenerError::InvalidPreset {
                category: category.to_string(),
                key: key.to_string(),
            })
    }

    fn build() -> PresetCatalog {
        let mut presets = BTreeMap::new();
        presets.insert(PresetCategory::Fundamental, fundamental_presets());
        presets.insert(PresetCategory::Technical, technical_presets());
        presets.insert(PresetCategory::TechnicalAdvanced, technical_advanced_presets());
        presets.insert(PresetCategory::FundamentalAdvanced, fundamental_advanced_presets());
        PresetCatalog { presets }
    }
}

pub fn list_categories() -> Vec<&'static str> {
    PresetCategory::ALL.iter().map(|c| c.as_str()).collect()
}

pub fn list_presets(category: PresetCategory) -> Vec<&'static str> {
    PresetCatalog::global().keys(category)
}

pub fn preset(category: PresetCategory, key: &str) -> Result<&'static ScreenerPreset, ScreenerError> {
    PresetCatalog::global().get(category, key)
}

fn preset_entry(
    category: PresetCategory,
    key: &'static str,
    description: &'static str,
    conditions: Vec<Predicate>,
) -> ScreenerPreset {
    ScreenerPreset {
        key,
        category,
        description,
        predicate: Predicate::and(conditions),
    }
}

fn fundamental_presets() -> Vec<ScreenerPreset> {
    use MetricField::*;
    let category = PresetCategory::Fundamental;
    vec![
        preset_entry(
            category,
            "bargain_bin_finder",
            "Cheap on earnings, book, sales and free cash flow",
            vec![
                Predicate::lt(PeTtm, 15.0),
                Predicate::lt(PbAnnual, 1.5),
                Predicate::lt(PsTtm, 2.0),
                Predicate::lt(PfcfShareTtm, 10.0),
            ],
        ),
        preset_entry(
            category,
            "dividend_dynamo",
            "High, sustainable dividend from a profitable company",
            vec![
                Predicate::gt(DividendYieldTtm, 3.0),
                Predicate::lt(PayoutRatioTtm, 60.0),
                Predicate::gt(RoeTtm, 10.0),
            ],
        ),
        preset_entry(
            category,
            "growth_rocket",
            "Fast top and bottom line growth with healthy margins",
            vec![
                Predicate::gt(RevenueGrowthTtmYoy, 20.0),
                Predicate::gt(EpsGrowthTtmYoy, 20.0),
                Predicate::gt(GrossMarginTtm, 40.0),
            ],
        ),
        preset_entry(
            category,
            "quality_compounder",
            "High returns on equity, solid margins, modest leverage",
            vec![
                Predicate::gt(RoeTtm, 15.0),
                Predicate::gt(NetProfitMarginTtm, 10.0),
                Predicate::lt(DebtToEquityAnnual, 1.0),
                Predicate::gt(CurrentRatioAnnual, 1.5),
            ],
        ),
        preset_entry(
            category,
            "cash_king",
            "Strong free cash flow and liquidity",
            vec![
                Predicate::lt(PfcfShareTtm, 15.0),
                Predicate::gt(CurrentRatioAnnual, 2.0),
                Predicate::gt(NetProfitMarginTtm, 5.0),
            ],
        ),
    ]
}

fn technical_presets() -> Vec<ScreenerPreset> {
    use MetricField::*;
    let category = PresetCategory::Technical;
    vec![
        preset_entry(
            category,
            "oversold_bounce",
            "RSI oversold",
            vec![Predicate::lt(Rsi, 30.0)],
        ),
        preset_entry(
            category,
            "overbought_alert",
            "RSI overbought",
            vec![Predicate::gt(Rsi, 70.0)],
        ),
        preset_entry(
            category,
            "golden_cross",
            "50-day above 200-day with price above the 50-day",
            vec![
                Predicate::relative(Sma50, Comparator::Gt, Sma200, 1.0),
                Predicate::relative(Close, Comparator::Gt, Sma50, 1.0),
            ],
        ),
        preset_entry(
            category,
            "death_cross",
            "50-day below 200-day with price below the 50-day",
            vec![
                Predicate::relative(Sma50, Comparator::Lt, Sma200, 1.0),
                Predicate::relative(Close, Comparator::Lt, Sma50, 1.0),
            ],
        ),
        preset_entry(
            category,
            "macd_bullish",
            "MACD above signal with a positive histogram",
            vec![
                Predicate::relative(Macd, Comparator::Gt, MacdSignal, 1.0),
                Predicate::gt(MacdHist, 0.0),
            ],
        ),
        preset_entry(
            category,
            "macd_bearish",
            "MACD below signal with a negative histogram",
            vec![
                Predicate::relative(Macd, Comparator::Lt, MacdSignal, 1.0),
                Predicate::lt(MacdHist, 0.0),
            ],
        ),
    ]
}

fn volume_surge() -> Predicate {
    use MetricField::*;
    Predicate::or(vec![
        Predicate::relative(Volume, Comparator::Gt, AvgVolume10d, 1.5),
        Predicate::relative(Volume, Comparator::Gt, AvgVolume3m, 2.0),
    ])
}

fn technical_advanced_presets() -> Vec<ScreenerPreset> {
    use MetricField::*;
    let category = PresetCategory::TechnicalAdvanced;
    vec![
        preset_entry(
            category,
            "strong_uptrend",
            "Trending market with buyers in control",
            vec![
                Predicate::gt(Adx, 25.0),
                Predicate::relative(PlusDi, Comparator::Gt, MinusDi, 1.0),
                Predicate::relative(Close, Comparator::Gt, Sma50, 1.0),
            ],
        ),
        preset_entry(
            category,
            "bollinger_breakout",
            "Close above the upper Bollinger band",
            vec![Predicate::relative(Close, Comparator::Gt, UpperBand, 1.0)],
        ),
        preset_entry(
            category,
            "bollinger_reversal",
            "Close below the lower band while oversold",
            vec![
                Predicate::relative(Close, Comparator::Lt, LowerBand, 1.0),
                Predicate::lt(Rsi, 35.0),
            ],
        ),
        preset_entry(
            category,
            "bullish_volume_vision",
            "Up day on unusual volume with positive momentum",
            vec![
                Predicate::gt(PercentChange, 0.0),
                volume_surge(),
                Predicate::gt(Rsi, 50.0),
            ],
        ),
        preset_entry(
            category,
            "bearish_volume_vision",
            "Down day on unusual volume with negative momentum",
            vec![
                Predicate::lt(PercentChange, 0.0),
                volume_surge(),
                Predicate::lt(Rsi, 50.0),
            ],
        ),
        preset_entry(
            category,
            "momentum_surge",
            "RSI in the 55-70 zone with rising MACD above the 50-day",
            vec![
                Predicate::between(Rsi, 55.0, 70.0),
                Predicate::gt(MacdHist, 0.0),
                Predicate::relative(Close, Comparator::Gt, Sma50, 1.0),
            ],
        ),
    ]
}

fn fundamental_advanced_presets() -> Vec<ScreenerPreset> {
    use MetricField::*;
    let category = PresetCategory::FundamentalAdvanced;
    vec![
        preset_entry(
            category,
            "deep_value",
            "Very low multiples with a dividend",
            vec![
                Predicate::lt(PeTtm, 10.0),
                Predicate::lt(PbAnnual, 1.0),
                Predicate::gt(DividendYieldTtm, 2.0),
            ],
        ),
        preset_entry(
            category,
            "growth_at_reasonable_price",
            "Earnings growth without an expensive multiple",
            vec![
                Predicate::lt(PegTtm, 1.0),
                Predicate::gt(EpsGrowthTtmYoy, 15.0),
                Predicate::lt(PeTtm, 25.0),
            ],
        ),
        preset_entry(
            category,
            "fortress_balance_sheet",
            "Low leverage and ample liquidity",
            vec![
                Predicate::lt(DebtToEquityAnnual, 0.5),
                Predicate::gt(CurrentRatioAnnual, 2.0),
                Predicate::gt(QuickRatioAnnual, 1.5),
            ],
        ),
        preset_entry(
            category,
            "margin_leader",
            "Best-in-class margins",
            vec![
                Predicate::gt(GrossMarginTtm, 50.0),
                Predicate::gt(OperatingMarginTtm, 20.0),
                Predicate::gt(NetProfitMarginTtm, 15.0),
            ],
        ),
        preset_entry(
            category,
            "low_volatility_income",
            "Defensive dividend payers",
            vec![
                Predicate::lt(Beta, 0.8),
                Predicate::gt(DividendYieldTtm, 2.5),
                Predicate::lt(PayoutRatioTtm, 75.0),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_category_has_presets() {
        for category in PresetCategory::ALL {
            let keys = list_presets(category);
            assert!(!keys.is_empty(), "no presets for {}", category);
            let unique: HashSet<_> = keys.iter().collect();
            assert_eq!(unique.len(), keys.len(), "duplicate key in {}", category);
        }
    }

    #[test]
    fn test_list_presets_is_stable() {
        assert_eq!(
            list_presets(PresetCategory::Fundamental),
            vec![
                "bargain_bin_finder",
                "dividend_dynamo",
                "growth_rocket",
                "quality_compounder",
                "cash_king"
            ]
        );
        assert_eq!(list_presets(PresetCategory::Technical).len(), 6);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "technical_advanced".parse::<PresetCategory>().unwrap(),
            PresetCategory::TechnicalAdvanced
        );
        assert_eq!(
            " Fundamental ".parse::<PresetCategory>().unwrap(),
            PresetCategory::Fundamental
        );
        assert!(matches!(
            "macro".parse::<PresetCategory>(),
            Err(ScreenerError::UnknownCategory(_))
        ));
        assert_eq!(
            list_categories(),
            vec!["fundamental", "technical", "technical_advanced", "fundamental_advanced"]
        );
    }

    #[test]
    fn test_unknown_preset_fails_fast() {
        let err = preset(PresetCategory::Fundamental, "golden_cross").unwrap_err();
        assert_eq!(
            err,
            ScreenerError::InvalidPreset {
                category: "fundamental".to_string(),
                key: "golden_cross".to_string(),
            }
        );
    }

    #[test]
    fn test_bargain_bin_finder_thresholds() {
        let preset = preset(PresetCategory::Fundamental, "bargain_bin_finder").unwrap();
        assert_eq!(preset.predicate.leaf_count(), 4);
        assert_eq!(
            preset.predicate,
            Predicate::and(vec![
                Predicate::lt(MetricField::PeTtm, 15.0),
                Predicate::lt(MetricField::PbAnnual, 1.5),
                Predicate::lt(MetricField::PsTtm, 2.0),
                Predicate::lt(MetricField::PfcfShareTtm, 10.0),
            ])
        );
    }

    #[test]
    fn test_volume_vision_presets_mix_and_or() {
        for key in ["bullish_volume_vision", "bearish_volume_vision"] {
            let preset = preset(PresetCategory::TechnicalAdvanced, key).unwrap();
            let Predicate::And(children) = &preset.predicate else {
                panic!("{} should be an AND group", key);
            };
            assert!(children.iter().any(|c| matches!(c, Predicate::Or(_))));
        }
    }

    #[test]
    fn test_preset_lookup_normalizes_key() {
        assert!(preset(PresetCategory::Technical, " Oversold_Bounce ").is_ok());
    }

    #[test]
    fn test_presets_export_as_json() {
        let catalog = PresetCatalog::global();
        let json = serde_json::to_string(catalog.presets(PresetCategory::TechnicalAdvanced)).unwrap();
        assert!(json.contains("\"bullish_volume_vision\""));
        assert!(json.contains("\"or\""));
    }
}
