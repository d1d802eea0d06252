use equiscore::config::EngineConfig;
use equiscore::domain::entities::screener::ScreenerQuery;
use equiscore::domain::errors::ScreenerError;
use equiscore::domain::services::screener::{
    list_categories, list_presets, MetricField, PerformanceWindow, PresetCategory,
    ScreenerQueryPlanner,
};
use equiscore::persistence::models::{CreatePriceBar, CreateSecurity};
use equiscore::persistence::{init_database, SqliteScreenerSource};
use std::sync::Arc;

struct Seed {
    symbol: &'static str,
    sector: &'static str,
    market_cap: f64,
    close: f64,
    percent_change: f64,
    priority: bool,
    metrics: Vec<(MetricField, f64)>,
}

fn cheap() -> Vec<(MetricField, f64)> {
    vec![
        (MetricField::PeTtm, 9.0),
        (MetricField::PbAnnual, 1.1),
        (MetricField::PsTtm, 1.2),
        (MetricField::PfcfShareTtm, 6.0),
    ]
}

fn expensive() -> Vec<(MetricField, f64)> {
    vec![
        (MetricField::PeTtm, 35.0),
        (MetricField::PbAnnual, 8.0),
        (MetricField::PsTtm, 9.0),
        (MetricField::PfcfShareTtm, 40.0),
    ]
}

async fn seeded_source() -> SqliteScreenerSource {
    let pool = init_database("sqlite::memory:").await.unwrap();
    let source = SqliteScreenerSource::new(pool);

    let seeds = vec![
        Seed {
            symbol: "VALU",
            sector: "Financial Services",
            market_cap: 2_000_000_000.0,
            close: 18.0,
            percent_change: 6.5,
            priority: true,
            metrics: cheap(),
        },
        Seed {
            symbol: "GROW",
            sector: "Technology",
            market_cap: 200_000_000_000.0,
            close: 310.0,
            percent_change: -2.0,
            priority: true,
            metrics: expensive(),
        },
        Seed {
            symbol: "MEGA",
            sector: "Technology",
            market_cap: 900_000_000_000.0,
            close: 180.0,
            percent_change: 12.0,
            priority: true,
            metrics: expensive(),
        },
        Seed {
            // Cheap, but outside the priority universe
            symbol: "OTCX",
            sector: "Energy",
            market_cap: 40_000_000.0,
            close: 0.8,
            percent_change: 1.0,
            priority: false,
            metrics: cheap(),
        },
    ];

    for seed in seeds {
        source
            .upsert_security(&CreateSecurity {
                symbol: seed.symbol.to_string(),
                company_name: Some(format!("{} Inc", seed.symbol)),
                sector: Some(seed.sector.to_string()),
                industry: None,
                market_cap: Some(seed.market_cap),
                is_priority: seed.priority,
            })
            .await
            .unwrap();
        for (date, close) in [("2024-03-01", seed.close * 0.9), ("2024-03-04", seed.close)] {
            source
                .upsert_bar(
                    PerformanceWindow::Daily,
                    &CreatePriceBar {
                        symbol: seed.symbol.to_string(),
                        date: date.to_string(),
                        close: Some(close),
                        percent_change: Some(seed.percent_change),
                        volume: Some(1_000_000.0),
                    },
                )
                .await
                .unwrap();
        }
        for (field, value) in seed.metrics {
            source.upsert_metric(seed.symbol, field, value).await.unwrap();
        }
    }

    source
}

async fn planner() -> ScreenerQueryPlanner {
    ScreenerQueryPlanner::new(Arc::new(seeded_source().await))
}

fn symbols(page: &equiscore::domain::entities::screener::ScreenPage) -> Vec<&str> {
    page.items.iter().map(|row| row.symbol.as_str()).collect()
}

#[tokio::test]
async fn test_bargain_bin_finder_returns_the_only_cheap_priority_security() {
    let planner = planner().await;
    let query = ScreenerQuery::new().with_preset(PresetCategory::Fundamental, "bargain_bin_finder");

    let page = planner.run_screen(&query).await.unwrap();
    assert_eq!(symbols(&page), vec!["VALU"]);
    assert_eq!(page.total_hint, 1);

    let row = &page.items[0];
    assert_eq!(row.close, Some(18.0));
    assert_eq!(row.company_name.as_deref(), Some("VALU Inc"));
    assert_eq!(row.sector.as_deref(), Some("Financial Services"));
}

#[tokio::test]
async fn test_market_cap_bracket_boundaries() {
    let planner = planner().await;

    let small = planner
        .run_screen(&ScreenerQuery::new().with_market_cap("small"))
        .await
        .unwrap();
    assert_eq!(symbols(&small), vec!["VALU"]);

    let mega = planner
        .run_screen(&ScreenerQuery::new().with_market_cap("mega"))
        .await
        .unwrap();
    assert_eq!(symbols(&mega), vec!["MEGA"]);

    let large = planner
        .run_screen(&ScreenerQuery::new().with_market_cap("large"))
        .await
        .unwrap();
    assert_eq!(symbols(&large), vec!["GROW"]);
}

#[tokio::test]
async fn test_sector_price_and_performance_filters_compose() {
    let planner = planner().await;

    let tech = planner
        .run_screen(&ScreenerQuery::new().with_sector("technology"))
        .await
        .unwrap();
    assert_eq!(symbols(&tech), vec!["GROW", "MEGA"]);

    let movers = planner
        .run_screen(
            &ScreenerQuery::new()
                .with_sector("TECHNOLOGY")
                .with_performance("daily", "up_10"),
        )
        .await
        .unwrap();
    assert_eq!(symbols(&movers), vec!["MEGA"]);

    let under_50 = planner
        .run_screen(&ScreenerQuery::new().with_price("under_50"))
        .await
        .unwrap();
    assert_eq!(symbols(&under_50), vec!["VALU"]);
}

#[tokio::test]
async fn test_unknown_brackets_apply_no_filter() {
    let planner = planner().await;
    let page = planner
        .run_screen(&ScreenerQuery::new().with_market_cap("colossal").with_price("free"))
        .await
        .unwrap();
    assert_eq!(symbols(&page), vec!["GROW", "MEGA", "VALU"]);
}

#[tokio::test]
async fn test_invalid_preset_and_sector_fail_fast() {
    let planner = planner().await;

    let err = planner
        .run_screen(&ScreenerQuery::new().with_preset(PresetCategory::Technical, "to_the_moon"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ScreenerError::InvalidPreset {
            category: "technical".to_string(),
            key: "to_the_moon".to_string(),
        }
    );

    let err = planner
        .run_screen(&ScreenerQuery::new().with_sector("Crypto"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScreenerError::InvalidFilterValue { .. }));
}

#[tokio::test]
async fn test_identical_queries_share_one_cache_entry() {
    let planner = planner().await;

    let first = ScreenerQuery::new()
        .with_preset(PresetCategory::Fundamental, "bargain_bin_finder")
        .with_market_cap("small")
        .with_sector("financial_services");
    let second = ScreenerQuery::new()
        .with_sector("Financial Services")
        .with_market_cap("SMALL")
        .with_preset(PresetCategory::Fundamental, "bargain_bin_finder");
    assert_eq!(
        planner.cache_key(&first).unwrap(),
        planner.cache_key(&second).unwrap()
    );

    let a = planner.run_screen(&first).await.unwrap();
    let b = planner.run_screen(&second).await.unwrap();
    assert_eq!(a, b);

    let stats = planner.cache_stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(planner.cached_entries().await, 1);
}

#[test]
fn test_catalog_is_enumerable() {
    assert_eq!(
        list_categories(),
        vec!["fundamental", "technical", "technical_advanced", "fundamental_advanced"]
    );
    for category in PresetCategory::ALL {
        assert!(!list_presets(category).is_empty());
    }
}

#[tokio::test]
async fn test_planner_follows_engine_config() {
    let config = EngineConfig {
        screener_default_page_size: 2,
        screener_max_page_size: 2,
        screener_cache_capacity: 1,
        ..EngineConfig::default()
    };
    let planner = ScreenerQueryPlanner::from_config(Arc::new(seeded_source().await), &config);

    let first = planner.run_screen(&ScreenerQuery::new()).await.unwrap();
    assert_eq!(symbols(&first), vec!["GROW", "MEGA"]);
    assert_eq!(first.page_size, 2);
    assert_eq!(first.total_hint, 3);

    // Requested size above the configured max is clamped
    let second = planner
        .run_screen(&ScreenerQuery::new().with_page(2, 50))
        .await
        .unwrap();
    assert_eq!(symbols(&second), vec!["VALU"]);
    assert_eq!(second.page_size, 2);

    // Capacity of one: the second page displaced the first
    assert_eq!(planner.cached_entries().await, 1);
    assert_eq!(planner.cache_stats().await.evictions, 1);
}
