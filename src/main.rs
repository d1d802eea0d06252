use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equiscore::application::services::ScoringService;
use equiscore::config::EngineConfig;
use equiscore::domain::services::scoring::TradingScoreAggregator;
use equiscore::persistence::{init_database, SqliteSnapshotStore, TradingScoreRepository};

const TOP_RANKING_SIZE: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "equiscore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    let config = EngineConfig::from_env();
    info!(
        database_url = %config.database_url,
        concurrency = config.scoring_concurrency,
        "Starting scoring run"
    );

    let pool = init_database(&config.database_url).await?;

    let service = ScoringService::with_aggregator(
        Arc::new(SqliteSnapshotStore::new(pool.clone())),
        TradingScoreRepository::new(pool),
        TradingScoreAggregator::with_news_sector_reference(config.news_sector_reference),
        config.scoring_concurrency,
    );

    let summary = match service.rescore_all().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Scoring run failed: {}", e);
            return Err(e.into());
        }
    };

    for (rank, report) in summary.reports.iter().take(TOP_RANKING_SIZE).enumerate() {
        info!(
            rank = rank + 1,
            symbol = %report.record.symbol,
            composite_score = report.record.composite_score,
            technical = report.record.technical_score,
            fundamental = report.record.fundamental_score,
            news = report.record.news_sentiment_score,
            social = report.record.social_sentiment_score,
            analyst = report.record.analyst_score,
            "Top trading score"
        );
    }

    if summary.failed() > 0 {
        warn!(failed = summary.failed(), "Some symbols could not be scored");
    }

    Ok(())
}
