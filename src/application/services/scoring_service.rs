//! Load → score → upsert, for one symbol or a batch.
//!
//! Symbols are independent: a batch runs them concurrently up to a fixed
//! bound and reports per-symbol failures without aborting the others.
//! Two concurrent runs for the same symbol both upsert; the last write wins.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::domain::errors::ScoringError;
use crate::domain::repositories::SnapshotReader;
use crate::domain::services::scoring::{TradingScoreAggregator, TradingScoreReport};
use crate::persistence::TradingScoreRepository;

pub const DEFAULT_SCORING_CONCURRENCY: usize = 8;

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct ScoringRunSummary {
    /// Successful reports, ranked by composite descending
    pub reports: Vec<TradingScoreReport>,
    pub failures: Vec<(String, ScoringError)>,
}

impl ScoringRunSummary {
    pub fn scored(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Clone)]
pub struct ScoringService {
    reader: Arc<dyn SnapshotReader>,
    repository: TradingScoreRepository,
    aggregator: Arc<TradingScoreAggregator>,
    concurrency: usize,
}

impl ScoringService {
    pub fn new(reader: Arc<dyn SnapshotReader>, repository: TradingScoreRepository) -> Self {
        Self::with_aggregator(
            reader,
            repository,
            TradingScoreAggregator::default(),
            DEFAULT_SCORING_CONCURRENCY,
        )
    }

    pub fn with_aggregator(
        reader: Arc<dyn SnapshotReader>,
        repository: TradingScoreRepository,
        aggregator: TradingScoreAggregator,
        concurrency: usize,
    ) -> Self {
        ScoringService {
            reader,
            repository,
            aggregator: Arc::new(aggregator),
            concurrency: concurrency.max(1),
        }
    }

    pub fn repository(&self) -> &TradingScoreRepository {
        &self.repository
    }

    /// Score one symbol and upsert the result
    pub async fn score_symbol(&self, symbol: &str) -> Result<TradingScoreReport, ScoringError> {
        let snapshot = self.reader.load_snapshot(symbol).await?;
        let report = self.aggregator.calculate(&snapshot);

        self.repository.upsert(&report.record).await.map_err(|e| {
            error!(symbol = %symbol, error = %e, "Failed to persist trading score");
            ScoringError::from(e)
        })?;

        info!(
            symbol = %symbol,
            composite_score = report.record.composite_score,
            missing_categories = report.missing_categories.len(),
            "Trading score computed and stored"
        );

        Ok(report)
    }

    /// Score many symbols concurrently. Results come back in input order.
    pub async fn score_symbols(
        &self,
        symbols: &[String],
    ) -> Vec<(String, Result<TradingScoreReport, ScoringError>)> {
        let mut results: Vec<(usize, String, Result<TradingScoreReport, ScoringError>)> =
            stream::iter(symbols.iter().cloned().enumerate())
                .map(|(index, symbol)| async move {
                    let result = self.score_symbol(&symbol).await;
                    (index, symbol, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, symbol, result)| (symbol, result))
            .collect()
    }

    /// Rescore every symbol the reader knows about
    pub async fn rescore_all(&self) -> Result<ScoringRunSummary, ScoringError> {
        let started = Instant::now();
        let symbols = self.reader.list_symbols().await?;

        let mut summary = ScoringRunSummary::default();
        for (symbol, result) in self.score_symbols(&symbols).await {
            match result {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Symbol could not be scored");
                    summary.failures.push((symbol, e));
                }
            }
        }
        summary.reports = TradingScoreAggregator::rank(summary.reports);

        info!(
            symbols = symbols.len(),
            scored = summary.scored(),
            failed = summary.failed(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scoring run completed"
        );

        Ok(summary)
    }
}
