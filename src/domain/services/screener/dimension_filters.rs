//! Dimension filters that compose with the category presets: sector,
//! market-cap bracket, price bracket and performance window.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::fields::MetricField;
use super::predicate::Predicate;
use crate::domain::errors::ScreenerError;

pub const KNOWN_SECTORS: [&str; 11] = [
    "Basic Materials",
    "Communication Services",
    "Consumer Cyclical",
    "Consumer Defensive",
    "Energy",
    "Financial Services",
    "Healthcare",
    "Industrials",
    "Real Estate",
    "Technology",
    "Utilities",
];

/// Title-case a sector name: separators become spaces, each word capitalized
pub fn canonical_sector(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonicalize and validate a sector filter value
pub fn resolve_sector(raw: &str) -> Result<String, ScreenerError> {
    let canonical = canonical_sector(raw);
    if KNOWN_SECTORS.contains(&canonical.as_str()) {
        Ok(canonical)
    } else {
        Err(ScreenerError::InvalidFilterValue {
            dimension: "sector".to_string(),
            value: raw.to_string(),
        })
    }
}

pub fn sector_predicate(canonical: &str) -> Predicate {
    Predicate::text_eq(MetricField::Sector, canonical)
}

const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapBracket {
    Nano,
    Micro,
    Small,
    Mid,
    Large,
    Mega,
}

impl MarketCapBracket {
    pub const ALL: [MarketCapBracket; 6] = [
        MarketCapBracket::Nano,
        MarketCapBracket::Micro,
        MarketCapBracket::Small,
        MarketCapBracket::Mid,
        MarketCapBracket::Large,
        MarketCapBracket::Mega,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketCapBracket::Nano => "nano",
            MarketCapBracket::Micro => "micro",
            MarketCapBracket::Small => "small",
            MarketCapBracket::Mid => "mid",
            MarketCapBracket::Large => "large",
            MarketCapBracket::Mega => "mega",
        }
    }

    /// Raw (first, second) bounds as the brackets were historically declared.
    ///
    /// Micro is declared high-to-low and small starts at 30M; both are kept.
    pub fn declared_bounds(&self) -> (Option<f64>, Option<f64>) {
        match self {
            MarketCapBracket::Nano => (None, Some(50.0 * MILLION)),
            MarketCapBracket::Micro => (Some(300.0 * MILLION), Some(50.0 * MILLION)),
            MarketCapBracket::Small => (Some(30.0 * MILLION), Some(2.0 * BILLION)),
            MarketCapBracket::Mid => (Some(2.0 * BILLION), Some(10.0 * BILLION)),
            MarketCapBracket::Large => (Some(10.0 * BILLION), Some(200.0 * BILLION)),
            MarketCapBracket::Mega => (Some(200.0 * BILLION), None),
        }
    }

    /// Nano and mega are strict, ranged brackets are inclusive
    pub fn to_predicate(&self) -> Predicate {
        match self.declared_bounds() {
            (None, Some(upper)) => Predicate::lt(MetricField::MarketCap, upper),
            (Some(lower), None) => Predicate::gt(MetricField::MarketCap, lower),
            (Some(a), Some(b)) => Predicate::between(MetricField::MarketCap, a.min(b), a.max(b)),
            (None, None) => Predicate::always(),
        }
    }
}

impl FromStr for MarketCapBracket {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        MarketCapBracket::ALL
            .iter()
            .copied()
            .find(|bracket| bracket.as_str() == key)
            .ok_or_else(|| ScreenerError::InvalidFilterValue {
                dimension: "market_cap".to_string(),
                value: s.to_string(),
            })
    }
}

/// Latest close price bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBracket {
    Under(f64),
    Over(f64),
    Range(f64, f64),
}

pub const STANDARD_PRICE_BRACKETS: [&str; 10] = [
    "under_1",
    "under_5",
    "under_10",
    "under_20",
    "under_50",
    "1_to_5",
    "5_to_10",
    "10_to_50",
    "over_50",
    "over_100",
];

impl PriceBracket {
    pub fn key(&self) -> String {
        match self {
            PriceBracket::Under(limit) => format!("under_{}", limit),
            PriceBracket::Over(limit) => format!("over_{}", limit),
            PriceBracket::Range(low, high) => format!("{}_to_{}", low, high),
        }
    }

    pub fn to_predicate(&self) -> Predicate {
        match *self {
            PriceBracket::Under(limit) => Predicate::lt(MetricField::Close, limit),
            PriceBracket::Over(limit) => Predicate::gt(MetricField::Close, limit),
            PriceBracket::Range(low, high) => Predicate::between(MetricField::Close, low, high),
        }
    }
}

impl FromStr for PriceBracket {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScreenerError::InvalidFilterValue {
            dimension: "price".to_string(),
            value: s.to_string(),
        };
        let parse = |v: &str| v.parse::<f64>().ok().filter(|n| n.is_finite() && *n >= 0.0);

        let key = s.trim().to_lowercase();
        if let Some(limit) = key.strip_prefix("under_") {
            return parse(limit).map(PriceBracket::Under).ok_or_else(invalid);
        }
        if let Some(limit) = key.strip_prefix("over_") {
            return parse(limit).map(PriceBracket::Over).ok_or_else(invalid);
        }
        if let Some((low, high)) = key.split_once("_to_") {
            return match (parse(low), parse(high)) {
                (Some(low), Some(high)) if low <= high => Ok(PriceBracket::Range(low, high)),
                _ => Err(invalid()),
            };
        }
        Err(invalid())
    }
}

/// Aggregation granularity of the price bars behind a screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceWindow {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl PerformanceWindow {
    pub const ALL: [PerformanceWindow; 3] = [
        PerformanceWindow::Daily,
        PerformanceWindow::Weekly,
        PerformanceWindow::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceWindow::Daily => "daily",
            PerformanceWindow::Weekly => "weekly",
            PerformanceWindow::Monthly => "monthly",
        }
    }

    /// Table holding the bars for this window
    pub fn table_name(&self) -> &'static str {
        match self {
            PerformanceWindow::Daily => "price_bars_daily",
            PerformanceWindow::Weekly => "price_bars_weekly",
            PerformanceWindow::Monthly => "price_bars_monthly",
        }
    }
}

impl fmt::Display for PerformanceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PerformanceWindow {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        PerformanceWindow::ALL
            .iter()
            .copied()
            .find(|window| window.as_str() == key)
            .ok_or_else(|| ScreenerError::InvalidFilterValue {
                dimension: "performance_window".to_string(),
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceDirection {
    Up,
    Down,
}

/// Percentage change over the window beyond a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceBracket {
    pub direction: PerformanceDirection,
    pub threshold_percent: u8,
}

pub const PERFORMANCE_BRACKETS: [&str; 6] = ["up_5", "up_10", "up_15", "down_5", "down_10", "down_15"];

impl Default for PerformanceBracket {
    fn default() -> Self {
        PerformanceBracket {
            direction: PerformanceDirection::Up,
            threshold_percent: 5,
        }
    }
}

impl PerformanceBracket {
    /// Parse a sub-key inside a recognized window; unknown sub-keys fall back to up 5%
    pub fn parse_or_default(sub_key: &str) -> Self {
        let key = sub_key.trim().to_lowercase();
        let parsed = key.split_once('_').and_then(|(direction, threshold)| {
            let direction = match direction {
                "up" => PerformanceDirection::Up,
                "down" => PerformanceDirection::Down,
                _ => return None,
            };
            match threshold.parse::<u8>() {
                Ok(threshold @ (5 | 10 | 15)) => Some(PerformanceBracket {
                    direction,
                    threshold_percent: threshold,
                }),
                _ => None,
            }
        });
        parsed.unwrap_or_default()
    }

    pub fn key(&self) -> String {
        let direction = match self.direction {
            PerformanceDirection::Up => "up",
            PerformanceDirection::Down => "down",
        };
        format!("{}_{}", direction, self.threshold_percent)
    }

    pub fn to_predicate(&self) -> Predicate {
        let threshold = f64::from(self.threshold_percent);
        match self.direction {
            PerformanceDirection::Up => Predicate::gt(MetricField::PercentChange, threshold),
            PerformanceDirection::Down => Predicate::lt(MetricField::PercentChange, -threshold),
        }
    }
}

pub fn list_market_cap_brackets() -> Vec<&'static str> {
    MarketCapBracket::ALL.iter().map(|b| b.as_str()).collect()
}

pub fn list_price_brackets() -> Vec<&'static str> {
    STANDARD_PRICE_BRACKETS.to_vec()
}

pub fn list_performance_brackets() -> Vec<(&'static str, Vec<&'static str>)> {
    PerformanceWindow::ALL
        .iter()
        .map(|window| (window.as_str(), PERFORMANCE_BRACKETS.to_vec()))
        .collect()
}
