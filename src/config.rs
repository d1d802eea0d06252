use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::application::services::scoring_service::DEFAULT_SCORING_CONCURRENCY;
use crate::domain::services::screener::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use crate::domain::services::screener::planner::{PageLimits, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::services::scoring::news_sentiment::DEFAULT_SECTOR_REFERENCE;

/// Runtime configuration for scoring and screening
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub database_url: String,
    pub screener_cache_ttl_seconds: u64, // Lifetime of a cached screen result
    pub screener_cache_capacity: usize,  // Max cached screen results (LRU)
    pub screener_default_page_size: u32,
    pub screener_max_page_size: u32,
    pub news_sector_reference: f64, // Sector news average used when none is supplied
    pub scoring_concurrency: usize, // Symbols scored in parallel during a batch run
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            database_url: "sqlite://data/equiscore.db".to_string(),
            screener_cache_ttl_seconds: DEFAULT_CACHE_TTL.as_secs(),
            screener_cache_capacity: DEFAULT_CACHE_CAPACITY,
            screener_default_page_size: DEFAULT_PAGE_SIZE,
            screener_max_page_size: MAX_PAGE_SIZE,
            news_sector_reference: DEFAULT_SECTOR_REFERENCE,
            scoring_concurrency: DEFAULT_SCORING_CONCURRENCY,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> EngineConfig {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; invalid values keep the default
    pub fn from_lookup<F>(lookup: F) -> EngineConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = EngineConfig::default();

        if let Some(url) = lookup("DATABASE_URL") {
            if !url.trim().is_empty() {
                config.database_url = url;
            }
        }

        read_in_range(
            &lookup,
            "SCREENER_CACHE_TTL_SECONDS",
            1..=3600,
            &mut config.screener_cache_ttl_seconds,
        );
        read_in_range(
            &lookup,
            "SCREENER_CACHE_CAPACITY",
            1..=100_000,
            &mut config.screener_cache_capacity,
        );
        read_in_range(
            &lookup,
            "SCREENER_MAX_PAGE_SIZE",
            1..=1000,
            &mut config.screener_max_page_size,
        );

        // Default page size is bounded by the (possibly overridden) max
        config.screener_default_page_size = config
            .screener_default_page_size
            .min(config.screener_max_page_size);
        read_in_range(
            &lookup,
            "SCREENER_DEFAULT_PAGE_SIZE",
            1..=config.screener_max_page_size,
            &mut config.screener_default_page_size,
        );

        read_in_range(
            &lookup,
            "NEWS_SECTOR_REFERENCE",
            0.0..=1.0,
            &mut config.news_sector_reference,
        );
        read_in_range(
            &lookup,
            "SCORING_CONCURRENCY",
            1..=64,
            &mut config.scoring_concurrency,
        );

        config
    }

    pub fn screener_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.screener_cache_ttl_seconds)
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_page_size: self.screener_default_page_size,
            max_page_size: self.screener_max_page_size,
        }
    }
}

fn read_in_range<F, T>(lookup: &F, key: &str, range: std::ops::RangeInclusive<T>, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display + Copy,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else { return };
    match raw.trim().parse::<T>() {
        Ok(value) if range.contains(&value) => *target = value,
        Ok(value) => {
            tracing::warn!(
                "Invalid {} value: {} (must be between {} and {}), using default: {}",
                key,
                value,
                range.start(),
                range.end(),
                target
            );
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse {} '{}': {}, using default: {}",
                key,
                raw,
                e,
                target
            );
        }
    }
}
