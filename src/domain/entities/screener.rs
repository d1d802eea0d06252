use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::services::screener::fields::MetricField;
use crate::domain::services::screener::predicate::MetricRecord;
use crate::domain::services::screener::presets::PresetCategory;

/// Request-scoped screening input. Owns no state and has no persisted identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenerQuery {
    /// At most one preset key per category
    #[serde(default)]
    pub presets: BTreeMap<PresetCategory, String>,
    pub sector: Option<String>,
    pub market_cap: Option<String>,
    pub price: Option<String>,
    pub performance_window: Option<String>,
    pub performance_bracket: Option<String>,
    #[serde(default)]
    pub page: u32,
    pub page_size: Option<u32>,
}

impl ScreenerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, category: PresetCategory, key: impl Into<String>) -> Self {
        self.presets.insert(category, key.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_market_cap(mut self, bracket: impl Into<String>) -> Self {
        self.market_cap = Some(bracket.into());
        self
    }

    pub fn with_price(mut self, bracket: impl Into<String>) -> Self {
        self.price = Some(bracket.into());
        self
    }

    pub fn with_performance(
        mut self,
        window: impl Into<String>,
        bracket: impl Into<String>,
    ) -> Self {
        self.performance_window = Some(window.into());
        self.performance_bracket = Some(bracket.into());
        self
    }

    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = Some(page_size);
        self
    }
}

/// One row of the joined "latest metrics per security" dataset for a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenerRecord {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub close: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<f64>,
    pub is_priority: bool,
    #[serde(default)]
    pub metrics: HashMap<MetricField, f64>,
}

impl ScreenerRecord {
    pub fn new(symbol: impl Into<String>) -> Self {
        ScreenerRecord {
            symbol: symbol.into(),
            is_priority: true,
            ..Default::default()
        }
    }

    pub fn with_metric(mut self, field: MetricField, value: f64) -> Self {
        match field {
            MetricField::MarketCap => self.market_cap = Some(value),
            MetricField::Close => self.close = Some(value),
            MetricField::PercentChange => self.percent_change = Some(value),
            MetricField::Volume => self.volume = Some(value),
            _ => {
                self.metrics.insert(field, value);
            }
        }
        self
    }
}

impl MetricRecord for ScreenerRecord {
    fn number(&self, field: MetricField) -> Option<f64> {
        let value = match field {
            MetricField::MarketCap => self.market_cap,
            MetricField::Close => self.close,
            MetricField::PercentChange => self.percent_change,
            MetricField::Volume => self.volume,
            MetricField::Sector | MetricField::Industry => None,
            other => self.metrics.get(&other).copied(),
        };
        value.filter(|v| v.is_finite())
    }

    fn text(&self, field: MetricField) -> Option<&str> {
        match field {
            MetricField::Sector => self.sector.as_deref(),
            MetricField::Industry => self.industry.as_deref(),
            _ => None,
        }
    }
}

/// Security as returned by a screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRow {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub close: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<f64>,
}

impl From<&ScreenerRecord> for SecurityRow {
    fn from(record: &ScreenerRecord) -> Self {
        SecurityRow {
            symbol: record.symbol.clone(),
            company_name: record.company_name.clone(),
            sector: record.sector.clone(),
            industry: record.industry.clone(),
            market_cap: record.market_cap,
            close: record.close,
            percent_change: record.percent_change,
            volume: record.volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenPage {
    pub items: Vec<SecurityRow>,
    pub page: u32,
    pub page_size: u32,
    /// Matches across all pages
    pub total_hint: usize,
}
