//! Query planning for the screener.
//!
//! A `ScreenerQuery` is normalized once (presets and sector fail fast, unknown
//! bracket keys are dropped), hashed into a stable cache key and compiled into
//! a single predicate tree that is evaluated against the latest rows of the
//! chosen window.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::cache::{CacheStats, ScreenCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use super::dimension_filters::{
    resolve_sector, sector_predicate, MarketCapBracket, PerformanceBracket, PerformanceWindow,
    PriceBracket,
};
use super::predicate::Predicate;
use super::presets::{preset, PresetCategory};
use crate::config::EngineConfig;
use crate::domain::entities::screener::{ScreenPage, ScreenerQuery, SecurityRow};
use crate::domain::errors::ScreenerError;
use crate::domain::repositories::ScreenerDataSource;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        PageLimits {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Query with every field resolved to its canonical form.
///
/// Serialized field order is fixed and presets live in a category-ordered map,
/// so the JSON form is identical for logically identical queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedQuery {
    pub presets: BTreeMap<PresetCategory, String>,
    pub sector: Option<String>,
    pub market_cap: Option<MarketCapBracket>,
    pub price: Option<PriceBracket>,
    pub window: PerformanceWindow,
    pub performance: Option<PerformanceBracket>,
    pub page: u32,
    pub page_size: u32,
}

impl NormalizedQuery {
    /// SHA-256 hex digest of the canonical JSON form
    pub fn cache_key(&self) -> Result<String, ScreenerError> {
        let canonical = serde_json::to_vec(self)
            .map_err(|e| ScreenerError::DataSource(format!("Failed to encode query: {}", e)))?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }

    /// Compile presets and dimension filters into one conjunction
    pub fn predicate(&self) -> Result<Predicate, ScreenerError> {
        let mut clauses = Vec::new();
        for (category, key) in &self.presets {
            clauses.push(preset(*category, key)?.predicate.clone());
        }
        if let Some(sector) = &self.sector {
            clauses.push(sector_predicate(sector));
        }
        if let Some(bracket) = &self.market_cap {
            clauses.push(bracket.to_predicate());
        }
        if let Some(bracket) = &self.price {
            clauses.push(bracket.to_predicate());
        }
        if let Some(bracket) = &self.performance {
            clauses.push(bracket.to_predicate());
        }
        Ok(Predicate::and(clauses))
    }

    fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }
}

pub struct ScreenerQueryPlanner {
    source: Arc<dyn ScreenerDataSource>,
    cache: ScreenCache,
    limits: PageLimits,
}

impl ScreenerQueryPlanner {
    pub fn new(source: Arc<dyn ScreenerDataSource>) -> Self {
        Self::with_settings(
            source,
            DEFAULT_CACHE_TTL,
            DEFAULT_CACHE_CAPACITY,
            PageLimits::default(),
        )
    }

    /// Planner with cache and paging settings taken from the engine config
    pub fn from_config(source: Arc<dyn ScreenerDataSource>, config: &EngineConfig) -> Self {
        Self::with_settings(
            source,
            config.screener_cache_ttl(),
            config.screener_cache_capacity,
            config.page_limits(),
        )
    }

    pub fn with_settings(
        source: Arc<dyn ScreenerDataSource>,
        cache_ttl: Duration,
        cache_capacity: usize,
        limits: PageLimits,
    ) -> Self {
        ScreenerQueryPlanner {
            source,
            cache: ScreenCache::new(cache_ttl, cache_capacity),
            limits,
        }
    }

    pub fn normalize(&self, query: &ScreenerQuery) -> Result<NormalizedQuery, ScreenerError> {
        let mut presets = BTreeMap::new();
        for (category, key) in &query.presets {
            let resolved = preset(*category, key)?;
            presets.insert(*category, resolved.key.to_string());
        }

        let sector = query.sector.as_deref().map(resolve_sector).transpose()?;

        let market_cap = query.market_cap.as_deref().and_then(|raw| {
            raw.parse::<MarketCapBracket>()
                .map_err(|e| warn!(market_cap = %raw, error = %e, "Ignoring unknown market cap bracket"))
                .ok()
        });

        let price = query.price.as_deref().and_then(|raw| {
            raw.parse::<PriceBracket>()
                .map_err(|e| warn!(price = %raw, error = %e, "Ignoring unknown price bracket"))
                .ok()
        });

        let (window, performance) = match query.performance_window.as_deref() {
            None => (
                PerformanceWindow::default(),
                query
                    .performance_bracket
                    .as_deref()
                    .map(PerformanceBracket::parse_or_default),
            ),
            Some(raw) => match raw.parse::<PerformanceWindow>() {
                Ok(window) => (
                    window,
                    query
                        .performance_bracket
                        .as_deref()
                        .map(PerformanceBracket::parse_or_default),
                ),
                Err(e) => {
                    warn!(window = %raw, error = %e, "Ignoring unknown performance window");
                    (PerformanceWindow::default(), None)
                }
            },
        };

        let page_size = query
            .page_size
            .unwrap_or(self.limits.default_page_size)
            .clamp(1, self.limits.max_page_size.max(1));

        Ok(NormalizedQuery {
            presets,
            sector,
            market_cap,
            price,
            window,
            performance,
            page: query.page.max(1),
            page_size,
        })
    }

    /// Cache key of a query, after normalization
    pub fn cache_key(&self, query: &ScreenerQuery) -> Result<String, ScreenerError> {
        self.normalize(query)?.cache_key()
    }

    pub async fn run_screen(&self, query: &ScreenerQuery) -> Result<ScreenPage, ScreenerError> {
        let normalized = self.normalize(query)?;
        let cache_key = normalized.cache_key()?;

        if let Some(page) = self.cache.get(&cache_key).await {
            debug!(cache_key = %cache_key, items = page.items.len(), "Screen cache hit");
            return Ok(page);
        }

        let predicate = normalized.predicate()?;
        let rows = self.source.latest_rows(normalized.window).await?;
        let scanned = rows.len();

        let mut matches: Vec<_> = rows
            .iter()
            .filter(|row| row.is_priority && predicate.evaluate(*row))
            .collect();
        matches.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let total_hint = matches.len();
        let items: Vec<SecurityRow> = matches
            .into_iter()
            .skip(normalized.offset())
            .take(normalized.page_size as usize)
            .map(SecurityRow::from)
            .collect();

        let page = ScreenPage {
            items,
            page: normalized.page,
            page_size: normalized.page_size,
            total_hint,
        };

        self.cache.insert(cache_key.clone(), page.clone()).await;

        info!(
            cache_key = %cache_key,
            window = %normalized.window,
            conditions = predicate.leaf_count(),
            scanned,
            total = total_hint,
            returned = page.items.len(),
            "Screen computed and cached"
        );

        Ok(page)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::screener::ScreenerRecord;
    use crate::domain::repositories::InMemoryScreenerSource;
    use crate::domain::services::screener::fields::MetricField;

    fn bargain(symbol: &str) -> ScreenerRecord {
        ScreenerRecord::new(symbol)
            .with_metric(MetricField::PeTtm, 10.0)
            .with_metric(MetricField::PbAnnual, 1.0)
            .with_metric(MetricField::PsTtm, 1.0)
            .with_metric(MetricField::PfcfShareTtm, 5.0)
            .with_metric(MetricField::Close, 12.0)
    }

    async fn planner_with(rows: Vec<ScreenerRecord>) -> ScreenerQueryPlanner {
        let source = InMemoryScreenerSource::new();
        source.set_rows(PerformanceWindow::Daily, rows).await;
        ScreenerQueryPlanner::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_cache_key_is_order_independent() {
        let planner = planner_with(Vec::new()).await;
        let first = ScreenerQuery::new()
            .with_preset(PresetCategory::Technical, "golden_cross")
            .with_preset(PresetCategory::Fundamental, "bargain_bin_finder")
            .with_sector("technology");
        let second = ScreenerQuery::new()
            .with_sector("Technology")
            .with_preset(PresetCategory::Fundamental, "BARGAIN_BIN_FINDER")
            .with_preset(PresetCategory::Technical, "golden_cross");

        let key = planner.cache_key(&first).unwrap();
        assert_eq!(key, planner.cache_key(&second).unwrap());
        assert_eq!(key.len(), 64);

        let other = first.clone().with_page(2, 20);
        assert_ne!(key, planner.cache_key(&other).unwrap());
    }

    #[tokio::test]
    async fn test_invalid_preset_fails_fast() {
        let planner = planner_with(Vec::new()).await;
        let query = ScreenerQuery::new().with_preset(PresetCategory::Fundamental, "moon_shot");
        assert_eq!(
            planner.run_screen(&query).await.unwrap_err(),
            ScreenerError::InvalidPreset {
                category: "fundamental".to_string(),
                key: "moon_shot".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_brackets_are_ignored() {
        let planner = planner_with(Vec::new()).await;
        let normalized = planner
            .normalize(
                &ScreenerQuery::new()
                    .with_market_cap("giant")
                    .with_price("cheap")
                    .with_performance("yearly", "up_5"),
            )
            .unwrap();
        assert_eq!(normalized.market_cap, None);
        assert_eq!(normalized.price, None);
        assert_eq!(normalized.performance, None);
        assert_eq!(normalized.window, PerformanceWindow::Daily);
    }

    #[tokio::test]
    async fn test_pagination_is_one_based_and_clamped() {
        let planner = planner_with(Vec::new()).await;
        let normalized = planner
            .normalize(&ScreenerQuery::new().with_page(0, 5_000))
            .unwrap();
        assert_eq!(normalized.page, 1);
        assert_eq!(normalized.page_size, MAX_PAGE_SIZE);

        let defaulted = planner.normalize(&ScreenerQuery::new()).unwrap();
        assert_eq!(defaulted.page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_run_screen_filters_sorts_and_pages() {
        let mut hidden = bargain("HIDE");
        hidden.is_priority = false;
        let rows = vec![
            bargain("ZETA"),
            bargain("ALFA"),
            bargain("MIKE"),
            hidden,
            bargain("PRCY").with_metric(MetricField::PeTtm, 40.0),
        ];
        let planner = planner_with(rows).await;
        let query = ScreenerQuery::new()
            .with_preset(PresetCategory::Fundamental, "bargain_bin_finder")
            .with_page(1, 2);

        let first = planner.run_screen(&query).await.unwrap();
        let symbols: Vec<_> = first.items.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ALFA", "MIKE"]);
        assert_eq!(first.total_hint, 3);

        let second = planner.run_screen(&query.clone().with_page(2, 2)).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].symbol, "ZETA");
    }

    #[tokio::test]
    async fn test_repeat_query_is_served_from_cache() {
        let planner = planner_with(vec![bargain("ALFA")]).await;
        let query = ScreenerQuery::new().with_preset(PresetCategory::Fundamental, "bargain_bin_finder");

        let first = planner.run_screen(&query).await.unwrap();
        let second = planner.run_screen(&query).await.unwrap();
        assert_eq!(first, second);

        let stats = planner.cache_stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(planner.cached_entries().await, 1);

        planner.clear_cache().await;
        assert_eq!(planner.cached_entries().await, 0);
    }

    #[test]
    fn test_empty_query_compiles_to_match_all() {
        let normalized = NormalizedQuery {
            presets: BTreeMap::new(),
            sector: None,
            market_cap: None,
            price: None,
            window: PerformanceWindow::Daily,
            performance: None,
            page: 1,
            page_size: 20,
        };
        assert_eq!(normalized.predicate().unwrap(), Predicate::always());
    }
}
